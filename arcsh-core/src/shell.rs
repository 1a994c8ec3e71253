//! Command dispatch for the archive shell.
//!
//! A [`Shell`] ties a [`PathResolver`] to a [`ShellConsole`]. Command lines are
//! split on whitespace into a verb and arguments; known verbs are dispatched
//! to the resolver and their results (or error messages) written to the
//! console.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ShellConfig;
use crate::console::ShellConsole;
use crate::error::{ShellError, ShellResult};
use crate::fs::{ArchiveTree, PathResolver, DEFAULT_TAIL_LINES};

/// Built-in shell commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Ls,
    Cd,
    Pwd,
    Tail,
    Exit,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::Ls,
        Builtin::Cd,
        Builtin::Pwd,
        Builtin::Tail,
        Builtin::Exit,
    ];

    /// Look up a command by the name typed at the prompt.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Ls => "ls",
            Builtin::Cd => "cd",
            Builtin::Pwd => "pwd",
            Builtin::Tail => "tail",
            Builtin::Exit => "exit",
        }
    }
}

/// What happened to a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Blank line, nothing to do.
    Empty,
    /// A builtin ran (successfully or not; failures are printed).
    Ran(Builtin),
    /// The verb is not a known command.
    Unknown(String),
}

/// Parse `tail` arguments into a file path and line count.
///
/// Accepts `FILE`, `FILE -N` and `FILE -n N`. A second argument that does
/// not start with `-` is ignored.
pub fn parse_tail_args<'a>(args: &[&'a str]) -> ShellResult<(&'a str, i64)> {
    let Some(&file) = args.first() else {
        return Err(ShellError::InvalidArgument("missing file operand".to_string()));
    };

    let count = match args.get(1) {
        Some(&"-n") => {
            let value = args
                .get(2)
                .ok_or_else(|| ShellError::InvalidArgument("-n".to_string()))?;
            parse_count(value)?
        }
        Some(flag) if flag.starts_with('-') => parse_count(&flag[1..])
            .map_err(|_| ShellError::InvalidArgument(flag.to_string()))?,
        _ => DEFAULT_TAIL_LINES,
    };
    Ok((file, count))
}

fn parse_count(value: &str) -> ShellResult<i64> {
    value
        .parse()
        .map_err(|_| ShellError::InvalidArgument(value.to_string()))
}

/// Interactive shell session over an archive tree.
pub struct Shell<C: ShellConsole> {
    resolver: PathResolver,
    console: C,
    hostname: String,
    running: bool,
}

impl<C: ShellConsole> Shell<C> {
    pub fn new(resolver: PathResolver, hostname: impl Into<String>, console: C) -> Self {
        Self {
            resolver,
            console,
            hostname: hostname.into(),
            running: true,
        }
    }

    /// Create a shell for a tree using the hostname and `..` mode from config.
    pub fn from_config(config: &ShellConfig, tree: Arc<ArchiveTree>, console: C) -> Self {
        let resolver = PathResolver::new(tree).with_parent_resolution(config.parent_resolution);
        Self::new(resolver, config.hostname.clone(), console)
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// False once `exit` has run.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Prompt text: `hostname:cwd$ `.
    pub fn prompt(&self) -> String {
        format!(
            "{}:{}$ ",
            self.hostname,
            self.resolver.print_working_directory()
        )
    }

    /// Write the prompt to the console.
    pub fn show_prompt(&mut self) {
        let prompt = self.prompt();
        self.console.write_prompt(&prompt);
    }

    /// Run a line typed at the prompt. Unknown verbs are reported.
    pub fn execute_line(&mut self, line: &str) -> Dispatch {
        let dispatch = self.dispatch(line);
        if let Dispatch::Unknown(verb) = &dispatch {
            self.console
                .write_line(&format!("{}: command not found", verb));
        }
        dispatch
    }

    /// Run script text line by line. Unknown verbs are skipped silently and
    /// `exit` ends the script. Returns the number of commands run.
    pub fn run_script_text(&mut self, text: &str) -> usize {
        let mut ran = 0;
        for line in text.lines() {
            match self.dispatch(line) {
                Dispatch::Ran(builtin) => {
                    ran += 1;
                    if builtin == Builtin::Exit {
                        break;
                    }
                }
                Dispatch::Unknown(verb) => debug!(verb = %verb, "ignoring unknown script command"),
                Dispatch::Empty => {}
            }
        }
        ran
    }

    /// Run a startup script file. A missing script is reported on the
    /// console and otherwise ignored.
    pub fn run_startup_script(&mut self, path: &Path) -> ShellResult<usize> {
        if !path.is_file() {
            self.console.write_line(&format!(
                "Startup script {} does not exist.",
                path.display()
            ));
            return Ok(0);
        }
        let text = std::fs::read_to_string(path)?;
        let ran = self.run_script_text(&text);
        info!(script = %path.display(), commands = ran, "startup script finished");
        Ok(ran)
    }

    fn dispatch(&mut self, line: &str) -> Dispatch {
        let mut tokens = line.split_whitespace();
        let Some(verb) = tokens.next() else {
            return Dispatch::Empty;
        };
        let args: Vec<&str> = tokens.collect();

        let Some(builtin) = Builtin::from_name(verb) else {
            return Dispatch::Unknown(verb.to_string());
        };
        debug!(command = builtin.name(), ?args, "dispatch");

        match builtin {
            Builtin::Ls => self.cmd_ls(&args),
            Builtin::Cd => self.cmd_cd(&args),
            Builtin::Pwd => self.cmd_pwd(),
            Builtin::Tail => self.cmd_tail(&args),
            Builtin::Exit => self.running = false,
        }
        Dispatch::Ran(builtin)
    }

    fn cmd_ls(&mut self, args: &[&str]) {
        let path = args.first().copied().unwrap_or(".");
        let line = match self.resolver.list_directory(path) {
            Ok(names) => names.join("  "),
            Err(_) => format!("ls: cannot access '{}': No such directory", path),
        };
        self.console.write_line(&line);
    }

    fn cmd_cd(&mut self, args: &[&str]) {
        let Some(&path) = args.first() else {
            self.console.write_line("cd: missing operand");
            return;
        };
        if self.resolver.change_directory(path).is_err() {
            self.console
                .write_line(&format!("cd: no such file or directory: {}", path));
        }
    }

    fn cmd_pwd(&mut self) {
        let cwd = self.resolver.print_working_directory().to_string();
        self.console.write_line(&cwd);
    }

    fn cmd_tail(&mut self, args: &[&str]) {
        if args.is_empty() {
            self.console.write_line("tail: missing file operand");
            return;
        }
        let (file, count) = match parse_tail_args(args) {
            Ok(parsed) => parsed,
            Err(e) => {
                let arg = match e {
                    ShellError::InvalidArgument(arg) => arg,
                    other => other.to_string(),
                };
                self.console
                    .write_line(&format!("tail: invalid number of lines: '{}'", arg));
                return;
            }
        };
        let line = match self.resolver.tail(file, count) {
            Ok(lines) => lines.join("\n"),
            Err(_) => format!("tail: cannot open '{}': No such file or directory", file),
        };
        self.console.write_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveEntry;
    use crate::console::HeadlessConsole;

    fn shell() -> Shell<HeadlessConsole> {
        let tree = ArchiveTree::build(vec![
            ArchiveEntry::file("dir1/file1.txt", "Line 1\nLine 2\nLine 3\nLine 4\nLine 5"),
            ArchiveEntry::directory("dir2/"),
            ArchiveEntry::file("readme.md", "hello"),
        ]);
        let resolver = PathResolver::new(Arc::new(tree));
        Shell::new(resolver, "test_host", HeadlessConsole::new())
    }

    fn run(shell: &mut Shell<HeadlessConsole>, line: &str) -> String {
        shell.console_mut().clear_output();
        shell.execute_line(line);
        shell.console().output_string()
    }

    #[test]
    fn test_builtin_names() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::from_name("rm"), None);
    }

    #[test]
    fn test_ls() {
        let mut shell = shell();
        assert_eq!(run(&mut shell, "ls"), "dir1  dir2  readme.md");
        assert_eq!(run(&mut shell, "ls /dir1"), "file1.txt");
        assert_eq!(run(&mut shell, "ls dir2"), "");
        assert_eq!(
            run(&mut shell, "ls readme.md"),
            "ls: cannot access 'readme.md': No such directory"
        );
    }

    #[test]
    fn test_cd_and_pwd() {
        let mut shell = shell();
        assert_eq!(run(&mut shell, "cd"), "cd: missing operand");
        assert_eq!(run(&mut shell, "cd dir1"), "");
        assert_eq!(run(&mut shell, "pwd"), "/dir1");
        assert_eq!(shell.prompt(), "test_host:/dir1$ ");
        assert_eq!(
            run(&mut shell, "cd nonexistent"),
            "cd: no such file or directory: nonexistent"
        );
        assert_eq!(run(&mut shell, "pwd"), "/dir1");
    }

    #[test]
    fn test_tail() {
        let mut shell = shell();
        assert_eq!(run(&mut shell, "tail"), "tail: missing file operand");
        assert_eq!(run(&mut shell, "tail /dir1/file1.txt -2"), "Line 4\nLine 5");
        assert_eq!(run(&mut shell, "tail /dir1/file1.txt -n 1"), "Line 5");
        assert_eq!(
            run(&mut shell, "tail /dir1/file1.txt -0"),
            "Line 1\nLine 2\nLine 3\nLine 4\nLine 5"
        );
        assert_eq!(
            run(&mut shell, "tail /dir1/file1.txt -x"),
            "tail: invalid number of lines: '-x'"
        );
        assert_eq!(
            run(&mut shell, "tail dir1"),
            "tail: cannot open 'dir1': No such file or directory"
        );
    }

    #[test]
    fn test_parse_tail_args() {
        assert_eq!(parse_tail_args(&["f"]).unwrap(), ("f", DEFAULT_TAIL_LINES));
        assert_eq!(parse_tail_args(&["f", "-3"]).unwrap(), ("f", 3));
        assert_eq!(parse_tail_args(&["f", "--3"]).unwrap(), ("f", -3));
        assert_eq!(parse_tail_args(&["f", "-n", "7"]).unwrap(), ("f", 7));
        assert_eq!(parse_tail_args(&["f", "7"]).unwrap(), ("f", DEFAULT_TAIL_LINES));
        assert!(matches!(
            parse_tail_args(&["f", "-"]),
            Err(ShellError::InvalidArgument(arg)) if arg == "-"
        ));
        assert!(matches!(
            parse_tail_args(&["f", "-n"]),
            Err(ShellError::InvalidArgument(_))
        ));
        assert!(parse_tail_args(&[]).is_err());
    }

    #[test]
    fn test_unknown_command() {
        let mut shell = shell();
        assert_eq!(run(&mut shell, "rm -rf /"), "rm: command not found");
        assert_eq!(shell.execute_line("   "), Dispatch::Empty);
    }

    #[test]
    fn test_exit() {
        let mut shell = shell();
        assert!(shell.is_running());
        assert_eq!(shell.execute_line("exit"), Dispatch::Ran(Builtin::Exit));
        assert!(!shell.is_running());
    }

    #[test]
    fn test_script_text() {
        let mut shell = shell();
        let ran = shell.run_script_text("cd dir1\n\nbogus command\npwd\nexit\npwd\n");
        assert_eq!(ran, 3);
        assert_eq!(shell.console().lines(), ["/dir1".to_string()]);
        assert!(!shell.is_running());
    }

    #[test]
    fn test_missing_startup_script() {
        let mut shell = shell();
        let ran = shell
            .run_startup_script(Path::new("/definitely/not/here.sh"))
            .unwrap();
        assert_eq!(ran, 0);
        assert_eq!(
            shell.console().output_string(),
            "Startup script /definitely/not/here.sh does not exist."
        );
        assert!(shell.is_running());
    }

    #[test]
    fn test_show_prompt() {
        let mut shell = shell();
        shell.show_prompt();
        assert_eq!(shell.console().prompts(), ["test_host:/$ ".to_string()]);
    }
}
