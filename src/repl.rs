//! Line-oriented chat panel. Owns the [`Assistant`] and is the only place its
//! state is touched; replies arrive through [`Assistant::next_event`] while
//! input keeps being read.

use log::{ debug, info };
use std::io;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

use crate::assistant::{ Assistant, AssistantEvent };

const HELP: &str = "Commands: /reset starts a new chat, /history lists it, /quit exits.";

enum Command<'a> {
    Quit,
    Reset,
    History,
    Help,
    Prompt(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    match line.trim() {
        "/quit" | "/exit" => Command::Quit,
        "/reset" | "/new" => Command::Reset,
        "/history" => Command::History,
        "/help" => Command::Help,
        _ => Command::Prompt(line),
    }
}

pub async fn run_chat<R, W>(assistant: &mut Assistant, input: R, mut output: W) -> io::Result<()>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
{
    let mut lines = input.lines();
    write_line(
        &mut output,
        &format!("Flow assistant ({}). {}", assistant.config().model, HELP)
    ).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                match parse_command(&line) {
                    Command::Quit => break,
                    Command::Help => write_line(&mut output, HELP).await?,
                    Command::History => {
                        for message in assistant.conversation().messages() {
                            write_line(&mut output, &format!("{}: {}", message.role, message.content)).await?;
                        }
                    }
                    Command::Reset => {
                        if assistant.reset() {
                            write_line(&mut output, "(new conversation)").await?;
                        } else {
                            write_line(&mut output, "(busy, wait for the reply)").await?;
                        }
                    }
                    Command::Prompt(text) => {
                        if text.trim().is_empty() {
                            continue;
                        }
                        if !assistant.submit(text) {
                            write_line(&mut output, "(busy, wait for the reply)").await?;
                        }
                    }
                }
            }
            Some(event) = assistant.next_event(), if assistant.is_busy() => {
                render(&mut output, &event).await?;
            }
        }
    }

    // A reply already on its way still belongs in the transcript.
    if let Some(event) = assistant.next_event().await {
        info!("Waiting for the in-flight reply before exiting");
        render(&mut output, &event).await?;
    }
    output.flush().await
}

async fn render<W>(output: &mut W, event: &AssistantEvent) -> io::Result<()> where W: AsyncWrite + Unpin {
    match event {
        AssistantEvent::Reply { content } => write_line(output, &format!("assistant: {}", content)).await,
        AssistantEvent::Failed { message } => write_line(output, &format!("error: {}", message)).await,
    }
}

async fn write_line<W>(output: &mut W, text: &str) -> io::Result<()> where W: AsyncWrite + Unpin {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
