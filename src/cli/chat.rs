use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, TimeZone};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::{ChatSession, KvChatStore, Role};
use crate::client::ProxyClient;
use crate::core::AppConfig;
use crate::core::db::async_db;

#[derive(Debug, PartialEq)]
enum Input {
    Message(String),
    NewChat,
    Archive,
    Load(String),
    Delete(String),
    Image(PathBuf),
    Help,
}

impl Input {
    fn parse(line: &str) -> Input {
        let line = line.trim();
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };
        match (cmd, arg.is_empty()) {
            ("/new", _) => Input::NewChat,
            ("/archive", _) => Input::Archive,
            ("/load", false) => Input::Load(arg.to_string()),
            ("/delete", false) => Input::Delete(arg.to_string()),
            ("/image", false) => Input::Image(PathBuf::from(arg)),
            ("/help", _) => Input::Help,
            _ => Input::Message(line.to_string()),
        }
    }
}

const HELP: &str = "/new  /archive  /load <id>  /delete <id>  /image <path>";

fn print_transcript(session: &ChatSession) {
    for msg in session.messages() {
        let who = match msg.role {
            Role::User => "أنت",
            Role::Assistant => "المساعد",
        };
        println!("{}: {}", who, msg.content);
    }
}

fn print_archive(session: &ChatSession) {
    if session.archive().is_empty() {
        println!("لا توجد محادثات محفوظة");
        return;
    }
    for record in session.archive() {
        let date = Local
            .timestamp_millis_opt(record.timestamp)
            .single()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!("{}  {}  {}", record.id, date, record.title);
    }
}

pub async fn run() -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let config = AppConfig::default();
    tokio::fs::create_dir_all(&config.storage_path).await?;
    let db = async_db(&config.db_path).await?;
    let client = ProxyClient::new(&config.service_url, &config.public_key);
    let mut session = ChatSession::open(client, Box::new(KvChatStore::new(db))).await?;

    println!("{}", HELP);

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() && session.pending_images().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match Input::parse(&line) {
                    Input::Message(text) => {
                        let mut printed = 0;
                        let result = session
                            .send(&text, |reply| {
                                print!("{}", &reply[printed..]);
                                let _ = std::io::stdout().flush();
                                printed = reply.len();
                            })
                            .await;
                        println!();
                        if let Err(e) = result {
                            println!("خطأ: {}", e);
                        }
                    }
                    Input::NewChat => session.new_chat(),
                    Input::Archive => print_archive(&session),
                    Input::Load(id) => match session.load(&id) {
                        Ok(()) => print_transcript(&session),
                        Err(e) => println!("خطأ: {}", e),
                    },
                    Input::Delete(id) => {
                        if let Err(e) = session.delete(&id).await {
                            println!("خطأ: {}", e);
                        }
                    }
                    Input::Image(path) => match session.attach_image(&path).await {
                        Ok(()) => println!("{} image(s) attached", session.pending_images().len()),
                        Err(e) => println!("خطأ: {}", e),
                    },
                    Input::Help => println!("{}", HELP),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
