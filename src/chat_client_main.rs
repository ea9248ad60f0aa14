//! Terminal chat client for a running `ragchat-backend`.
//!
//! Each line read from stdin is sent to `/api/read`; `/index` triggers
//! `/api/setup` and `/quit` exits.

use std::env;

use anyhow::Context;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};

use ragchat_backend::chat::{ChatState, RequestTicket};
use ragchat_backend::core;

const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    core::logging::init_stderr("warn");

    let server = env::var("RAGCHAT_SERVER")
        .unwrap_or_else(|_| DEFAULT_SERVER.to_string())
        .trim_end_matches('/')
        .to_string();
    let client = Client::new();
    let mut state = ChatState::new();

    eprintln!(
        "Connected to {}. Type a question, /index to build the index, /quit to exit.",
        server
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/index" => {
                eprintln!("Indexing documents...");
                match post_json(&client, &format!("{}/api/setup", server), json!({})).await {
                    Ok(body) => println!("{}", body["data"].as_str().unwrap_or("done")),
                    Err(err) => eprintln!("Index failed: {:#}", err),
                }
            }
            _ => {
                let Some(ticket) = state.submit(&line) else {
                    continue;
                };
                eprintln!("Asking AI ...");
                let outcome = ask(&client, &server, &ticket).await;
                if let Ok(answer) = &outcome {
                    println!("{}", answer);
                }
                state.resolve(ticket, outcome.map_err(|err| format!("{:#}", err)));
            }
        }
    }

    Ok(())
}

async fn ask(client: &Client, server: &str, ticket: &RequestTicket) -> anyhow::Result<String> {
    let body = json!({
        "question": ticket.question,
        "chatHistory": ticket.history,
    });
    let response = post_json(client, &format!("{}/api/read", server), body).await?;
    response["data"]
        .as_str()
        .map(|s| s.to_string())
        .context("Response had no data field")
}

async fn post_json(client: &Client, url: &str, body: Value) -> anyhow::Result<Value> {
    let res = client
        .post(url)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?;
    let status = res.status();
    let payload: Value = res.json().await.context("Response was not JSON")?;
    if !status.is_success() {
        let message = payload["error"].as_str().unwrap_or("unknown error");
        anyhow::bail!("{} ({})", message, status);
    }
    Ok(payload)
}
