pub mod commands;

use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::i18n::TextKey;
use crate::session::controller::{GenerateOutcome, GenerationController, Prompter, Resolution};
use crate::session::state::{FieldEdit, Status};
use commands::{Command, SCHEMA_TERMINATOR};

/// Terminal front end: one console is one session.
pub struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.lines.next_line().await
    }
}

#[async_trait]
impl Prompter for Console {
    async fn confirm(&mut self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        let _ = std::io::stdout().flush();

        match self.next_line().await {
            Ok(Some(answer)) => matches!(
                answer.trim().to_ascii_lowercase().as_str(),
                "y" | "yes" | "はい"
            ),
            _ => false,
        }
    }

    fn notify(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Runs the interactive loop until `:quit` or end of input.
pub async fn run_console(
    mut controller: GenerationController,
    mut resolutions: mpsc::UnboundedReceiver<Resolution>,
) -> std::io::Result<()> {
    let mut console = Console::new();
    let mut schema_capture: Option<Vec<String>> = None;

    println!("{}", controller.text(TextKey::Title));
    println!("{}", controller.text(TextKey::Help));

    loop {
        tokio::select! {
            Some(resolution) = resolutions.recv() => {
                controller.resolve(resolution);
                render_outcome(&controller);
            }
            line = console.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed; leaving console");
                    break;
                };

                if let Some(buffer) = schema_capture.as_mut() {
                    if line.trim() == SCHEMA_TERMINATOR {
                        let schema = buffer.join("\n");
                        schema_capture = None;
                        controller.edit_field(FieldEdit::Schema(schema));
                    } else {
                        buffer.push(line);
                    }
                    continue;
                }

                let Some(command) = commands::parse(&line) else {
                    continue;
                };
                debug!("Console command: {:?}", command);

                match command {
                    Command::Edit(edit) => controller.edit_field(edit),
                    Command::BeginSchema => schema_capture = Some(Vec::new()),
                    Command::Generate => {
                        if let GenerateOutcome::Started { .. } = controller.generate(&mut console).await {
                            println!("{}", controller.text(TextKey::Generating));
                        }
                    }
                    Command::Stop => {
                        if controller.stop() {
                            println!("{}", controller.text(TextKey::Stopped));
                        }
                    }
                    Command::Clear => {
                        if !controller.clear_all() {
                            console.notify(controller.text(TextKey::NothingToClear));
                        }
                    }
                    Command::Copy => {
                        let key = if controller.copy_output() {
                            TextKey::Copied
                        } else {
                            TextKey::CopyFailed
                        };
                        println!("{}", controller.text(key));
                    }
                    Command::Show => render_session(&controller),
                    Command::Help => println!("{}", controller.text(TextKey::Help)),
                    Command::Quit => break,
                    Command::Invalid(input) => {
                        println!("? {}", input);
                        println!("{}", controller.text(TextKey::Help));
                    }
                }
            }
        }
    }

    controller.stop();
    Ok(())
}

fn render_outcome(controller: &GenerationController) {
    let output = &controller.session().output;
    match controller.status() {
        Status::Success => println!("{}", output),
        Status::ServerError | Status::NetworkError => println!("! {}", output),
        Status::Idle | Status::Loading | Status::Aborted => {}
    }
}

fn render_session(controller: &GenerationController) {
    let session = controller.session();
    println!("language: {}", session.language);
    println!("database: {}", session.database);
    if let Some(mode) = session.sql_mode {
        println!("mode:     {}", mode);
    }
    println!("status:   {:?}", session.status);
    println!("schema:\n{}", session.schema);
    println!("criteria: {}", session.criteria);
    println!("output:\n{}", session.output);
    if controller.is_copied() {
        println!("{}", controller.text(TextKey::Copied));
    }
}
