//! MakeServer: build the weather server in two steps

use eyre::Result;

use crate::session::Session;
use crate::tutorial::helpers::editor_options;
use crate::tutorial::{StepFlow, Tutorial, Workspace};

use super::INIT_PY;

const LIFESPAN_SNIPPET: &str = r#"from contextlib import asynccontextmanager
from collections.abc import AsyncIterator
from mcp.server import Server
import mcp.server.stdio
from mcp.server.models import InitializationOptions
from mcp.server.lowlevel.server import NotificationOptions

@asynccontextmanager
async def server_lifespan(server: Server) -> AsyncIterator[str]:
    try:
        # A real server would yield something expensive, like a db connection
        yield server.name
    finally:
        pass

server = Server("weather", lifespan=server_lifespan)"#;

const RUN_SNIPPET: &str = r#"async def run():
    async with mcp.server.stdio.stdio_server() as (read_stream, write_stream):
        await server.run(
            read_stream,
            write_stream,
            InitializationOptions(
                server_name="weather",
                server_version="0.1.0",
                capabilities=server.get_capabilities(
                    notification_options=NotificationOptions(),
                    experimental_capabilities={},
                ),
            ),
        )

def main():
    import asyncio
    asyncio.run(run())"#;

/// Patterns each step must leave in `__init__.py`, anchored at line start so
/// commented-out code does not count
const STEP_PATTERNS: [&[&str]; 2] = [
    &[r"(?m)^server\s*=\s*Server\(", r"(?m)^@asynccontextmanager\s*$"],
    &[r"(?m)^async\s+def\s+run\s*\(", r"(?m)^def\s+main\s*\("],
];

#[derive(Debug, Default)]
pub struct MakeServer;

impl MakeServer {
    pub fn boxed() -> Box<dyn Tutorial> {
        Box::new(Self)
    }
}

fn step_patterns(step: usize) -> &'static [&'static str] {
    step.checked_sub(1)
        .and_then(|i| STEP_PATTERNS.get(i))
        .copied()
        .unwrap_or(&[])
}

impl Tutorial for MakeServer {
    fn name(&self) -> &'static str {
        "MakeServer"
    }

    fn description(&self) -> &'static str {
        "Create a weather server with step-by-step instructions"
    }

    fn total_steps(&self) -> usize {
        STEP_PATTERNS.len()
    }

    fn check(&self, step: usize, workspace: &Workspace) -> Result<bool> {
        let patterns = step_patterns(step);
        if patterns.is_empty() {
            return Ok(false);
        }
        workspace.matches_all(INIT_PY, patterns)
    }

    fn run_step(&mut self, step: usize, session: &mut Session) -> Result<StepFlow> {
        if !session.workspace.exists(INIT_PY) {
            let msg = session.text("make_server.missing");
            session.display.warn(&msg);
            return Ok(StepFlow::Abandon);
        }

        session.display.clear();
        match step {
            1 => {
                let title = session.text("make_server.step1.title");
                session.display.title_box(&title);
                let instruct = session.text("make_server.step1.instruct");
                session.display.instruct(&instruct);
                let lifespan = session.text("make_server.step1.lifespan");
                session.display.emphasize(&lifespan);
                session.display.snippet(LIFESPAN_SNIPPET);
            }
            _ => {
                let title = session.text("make_server.step2.title");
                session.display.title_box(&title);
                let instruct = session.text("make_server.step2.instruct");
                session.display.instruct(&instruct);
                session.display.snippet(RUN_SNIPPET);
            }
        }

        let file = session.workspace.path(INIT_PY);
        editor_options(session, &file, |ws| ws.matches_all(INIT_PY, step_patterns(step)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{LineKind, MemoryDisplay};
    use crate::editor::EditorLauncher;
    use crate::i18n::Translator;
    use crate::input::ScriptedInput;
    use std::fs;
    use tempfile::TempDir;

    fn write_init(temp: &TempDir, content: &str) {
        let dir = temp.path().join("mcp-weather/src/mcp_weather");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("__init__.py"), content).unwrap();
    }

    #[test]
    fn test_steps_check_their_own_markers() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path());
        assert!(!MakeServer.check(1, &ws).unwrap());

        write_init(&temp, LIFESPAN_SNIPPET);
        assert!(MakeServer.check(1, &ws).unwrap());
        assert!(!MakeServer.check(2, &ws).unwrap());

        write_init(&temp, &format!("{}\n\n{}\n", LIFESPAN_SNIPPET, RUN_SNIPPET));
        assert!(MakeServer.check(1, &ws).unwrap());
        assert!(MakeServer.check(2, &ws).unwrap());
        assert!(!MakeServer.check(3, &ws).unwrap());
    }

    #[test]
    fn test_check_tolerates_spacing_but_not_comments() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::new(temp.path());

        write_init(&temp, "@asynccontextmanager\nasync def lifespan(s): ...\nserver=Server(\"weather\")\n");
        assert!(MakeServer.check(1, &ws).unwrap());

        write_init(&temp, "@asynccontextmanager\n# server = Server(\"weather\")\n");
        assert!(!MakeServer.check(1, &ws).unwrap());

        write_init(&temp, "async  def run( ):\n    pass\n\ndef main():\n    pass\n");
        assert!(MakeServer.check(2, &ws).unwrap());
    }

    #[test]
    fn test_run_step_warns_without_project() {
        let temp = TempDir::new().unwrap();
        let display = MemoryDisplay::new();
        let mut session = Session::new(
            Box::new(display.clone()),
            Box::new(ScriptedInput::default()),
            Translator::english(),
            EditorLauncher::default(),
            Workspace::new(temp.path()),
        );

        assert_eq!(MakeServer.run_step(1, &mut session).unwrap(), StepFlow::Abandon);
        assert_eq!(display.of_kind(LineKind::Warn).len(), 1);
    }

    #[test]
    fn test_run_step_shows_step_snippet() {
        let temp = TempDir::new().unwrap();
        write_init(&temp, "");
        let display = MemoryDisplay::new();
        let mut session = Session::new(
            Box::new(display.clone()),
            Box::new(ScriptedInput::new(["4"])),
            Translator::english(),
            EditorLauncher::default(),
            Workspace::new(temp.path()),
        );

        assert_eq!(MakeServer.run_step(2, &mut session).unwrap(), StepFlow::Abandon);
        assert!(display.contains("Step 2: Add Run Function and Main"));
        assert_eq!(display.of_kind(LineKind::Snippet), vec![RUN_SNIPPET.to_string()]);
    }
}
