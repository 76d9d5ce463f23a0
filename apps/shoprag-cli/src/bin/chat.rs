use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use shoprag_answer::{AnswerGenerator, ChatClient, ShopAssistant};
use shoprag_cli::{format_hits, init_tracing, open_retriever};
use shoprag_core::config::Config;
use shoprag_core::types::SearchHit;

/// Ask questions about the shop catalogue and FAQs.
#[derive(Parser, Debug)]
#[command(name = "shoprag-chat", version)]
struct Args {
    /// Answer a single question and exit
    #[arg(short, long)]
    question: Option<String>,
    /// Print retrieved chunks after every answer
    #[arg(long)]
    debug: bool,
}

const HELP: &str = "Commands: /sources (chunks behind the last answer), /history, /clear, /quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = Config::load()?.settings()?;

    let retriever = open_retriever(&settings).await?;
    let client = ChatClient::from_settings(&settings.llm)?;
    let assistant = ShopAssistant::new(retriever, AnswerGenerator::new(client, &settings.llm), settings.retrieval.top_k);

    if let Some(question) = args.question {
        let (reply, hits) = assistant.ask_with_sources(&question).await;
        println!("{}", reply);
        if args.debug {
            println!("{}", format_hits(&hits));
        }
        return Ok(());
    }

    println!("🛍️  Shop assistant ready ({} chunks indexed). {}", assistant.retriever().len(), HELP);
    let mut history: Vec<(String, String)> = Vec::new();
    let mut last_sources: Vec<SearchHit> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else { break };
        let question = line.trim();
        match question {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => println!("{HELP}"),
            "/clear" => {
                history.clear();
                last_sources.clear();
                println!("History cleared.");
            }
            "/history" => {
                for (q, a) in &history {
                    println!("You: {q}\nBot: {a}\n");
                }
            }
            "/sources" => println!("{}", format_hits(&last_sources)),
            _ => {
                let (reply, hits) = assistant.ask_with_sources(question).await;
                let text = reply.text();
                println!("{text}");
                if args.debug {
                    println!("{}", format_hits(&hits));
                }
                history.push((question.to_string(), text));
                last_sources = hits;
            }
        }
    }
    Ok(())
}
