//! FastMcpClient: an MCP client that talks to servers and an LLM

use std::fs;

use eyre::{Context, Result};

use crate::session::Session;
use crate::tutorial::helpers::editor_options;
use crate::tutorial::{StepFlow, Tutorial, Workspace};

const CLIENT_PYPROJECT: &str = "mcp-client/pyproject.toml";
const CLIENT_PY: &str = "mcp-client/src/mcp_client/client.py";

const SETUP_SNIPPET: &str = r#"# In your terminal:
$ hatch new mcp-client
$ cd mcp-client

# Add dependencies
$ uv add mcp anthropic python-dotenv"#;

const CLIENT_SNIPPET: &str = r#"import asyncio
import sys
from typing import Optional
from contextlib import AsyncExitStack

from mcp import ClientSession, StdioServerParameters
from mcp.client.stdio import stdio_client
from anthropic import Anthropic
from dotenv import load_dotenv

load_dotenv()

class MCPClient:
    def __init__(self):
        self.session: Optional[ClientSession] = None
        self.exit_stack = AsyncExitStack()
        self.anthropic = Anthropic()

    async def connect_to_server(self, server_script_path: str):
        is_python = server_script_path.endswith('.py')
        is_js = server_script_path.endswith('.js')
        if not (is_python or is_js):
            raise ValueError('Server script must be a .py or .js file')
        command = 'python' if is_python else 'node'
        params = StdioServerParameters(command=command, args=[server_script_path], env=None)
        self.stdio, self.write = await self.exit_stack.enter_async_context(stdio_client(params))
        self.session = await self.exit_stack.enter_async_context(ClientSession(self.stdio, self.write))
        await self.session.initialize()
        response = await self.session.list_tools()
        print('\nConnected to server with tools:', [tool.name for tool in response.tools])

    async def process_query(self, query: str) -> str:
        messages = [{"role": "user", "content": query}]
        response = await self.session.list_tools()
        tools = [{
            "name": tool.name,
            "description": tool.description,
            "input_schema": tool.inputSchema,
        } for tool in response.tools]
        response = self.anthropic.messages.create(
            model="claude-3-5-sonnet-20241022",
            max_tokens=1000,
            messages=messages,
            tools=tools,
        )
        final_text = []
        for content in response.content:
            if content.type == 'text':
                final_text.append(content.text)
            elif content.type == 'tool_use':
                result = await self.session.call_tool(content.name, content.input)
                final_text.append(f"[Calling tool {content.name} with args {content.input}]")
                messages.append({"role": "assistant", "content": [content]})
                messages.append({"role": "user", "content": [{
                    "type": "tool_result",
                    "tool_use_id": content.id,
                    "content": result.content,
                }]})
                response = self.anthropic.messages.create(
                    model="claude-3-5-sonnet-20241022",
                    max_tokens=1000,
                    messages=messages,
                    tools=tools,
                )
                final_text.append(response.content[0].text)
        return "\n".join(final_text)"#;

const CHAT_SNIPPET: &str = r#"    async def chat_loop(self):
        print("\nMCP Client Started!")
        print("Type your queries or 'quit' to exit.")
        while True:
            try:
                query = input("\nQuery: ").strip()
                if query.lower() == 'quit':
                    break
                print("\n" + await self.process_query(query))
            except Exception as e:
                print(f"\nError: {str(e)}")

    async def cleanup(self):
        await self.exit_stack.aclose()

async def main():
    if len(sys.argv) < 2:
        print("Usage: python client.py <path_to_server_script>")
        sys.exit(1)
    client = MCPClient()
    try:
        await client.connect_to_server(sys.argv[1])
        await client.chat_loop()
    finally:
        await client.cleanup()

if __name__ == "__main__":
    asyncio.run(main())"#;

#[derive(Debug, Default)]
pub struct FastMcpClient;

impl FastMcpClient {
    pub fn boxed() -> Box<dyn Tutorial> {
        Box::new(Self)
    }
}

/// File the user edits for `step`, plus the markers it must contain
fn step_target(step: usize) -> Option<(&'static str, &'static [&'static str])> {
    match step {
        1 => Some((CLIENT_PYPROJECT, &["mcp", "anthropic", "python-dotenv"])),
        2 => Some((CLIENT_PY, &["class MCPClient", "connect_to_server", "process_query"])),
        3 => Some((CLIENT_PY, &["async def chat_loop"])),
        _ => None,
    }
}

fn step_satisfied(step: usize, workspace: &Workspace) -> Result<bool> {
    match step_target(step) {
        Some((file, markers)) => workspace.contains_all(file, markers),
        None => Ok(false),
    }
}

impl Tutorial for FastMcpClient {
    fn name(&self) -> &'static str {
        "FastMcpClient"
    }

    fn description(&self) -> &'static str {
        "Build an MCP client that talks to servers, LLMs and tools"
    }

    fn total_steps(&self) -> usize {
        3
    }

    fn check(&self, step: usize, workspace: &Workspace) -> Result<bool> {
        step_satisfied(step, workspace)
    }

    fn run_step(&mut self, step: usize, session: &mut Session) -> Result<StepFlow> {
        let Some((file, _)) = step_target(step) else {
            return Ok(StepFlow::Abandon);
        };

        session.display.clear();
        let (title, instruct, snippet) = match step {
            1 => ("fastmcp_client.step1.title", "fastmcp_client.step1.instruct", SETUP_SNIPPET),
            2 => ("fastmcp_client.step2.title", "fastmcp_client.step2.instruct", CLIENT_SNIPPET),
            _ => ("fastmcp_client.step3.title", "fastmcp_client.step3.instruct", CHAT_SNIPPET),
        };
        let title = session.text(title);
        session.display.title_box(&title);
        let instruct = session.text(instruct);
        session.display.instruct(&instruct);
        session.display.snippet(snippet);

        let path = session.workspace.path(file);
        if step > 1 {
            if let Some(dir) = path.parent() {
                // Editors can create the file but not its package directory
                fs::create_dir_all(dir).context(format!("Failed to create {}", dir.display()))?;
            }
        }

        editor_options(session, &path, |ws| step_satisfied(step, ws))
    }
}
