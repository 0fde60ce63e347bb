use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    sort::SortKey, DurableSettingsStore, HttpSearchGateway, InMemorySettingsStore, SearchView,
    SettingsStore, StoriesClient,
};
use shared::domain::StoryId;
use tokio::io::AsyncBufReadExt;
use url::Url;

mod config;

#[derive(Parser, Debug)]
#[command(name = "stories", about = "Search hacker-news-style stories from the terminal")]
struct Args {
    /// Search API base URL (overrides config file and environment).
    #[arg(long)]
    base_url: Option<String>,
    /// Sqlite path or URL holding the persisted search term. Without it the
    /// term lives in memory for this run only.
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(database) = args.database {
        settings.database_url = Some(database);
    }

    let base_url = Url::parse(&settings.base_url)
        .with_context(|| format!("invalid base url '{}'", settings.base_url))?;

    let store: Arc<dyn SettingsStore> = match &settings.database_url {
        Some(raw) => {
            let database_url = config::normalize_database_url(raw);
            DurableSettingsStore::initialize(&database_url).await?
        }
        None => Arc::new(InMemorySettingsStore::new()),
    };

    let client = StoriesClient::initialize_with_options(
        base_url,
        &settings.default_search,
        Arc::new(HttpSearchGateway::new()),
        store,
    )
    .await?;

    println!("My Hacker Stories. Type a term to search, :help for commands.");
    print_view(&settled_view(&client).await);

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            ":q" | ":quit" => break,
            ":help" => print_help(),
            ":recent" => {
                let view = client.view().await;
                if view.recent_searches.is_empty() {
                    println!("No recent searches yet.");
                } else {
                    for (index, term) in view.recent_searches.iter().enumerate() {
                        println!("{}. {term}", index + 1);
                    }
                }
            }
            ":more" => {
                if let Err(err) = client.load_more().await {
                    eprintln!("error: {err:#}");
                } else {
                    print_view(&settled_view(&client).await);
                }
            }
            _ if line.starts_with(":recent ") => {
                let pick = line[":recent ".len()..].trim();
                let view = client.view().await;
                let term = match pick.parse::<usize>() {
                    Ok(n) if n >= 1 && n <= view.recent_searches.len() => {
                        view.recent_searches[n - 1].clone()
                    }
                    _ => {
                        eprintln!("pick a number between 1 and {}", view.recent_searches.len());
                        continue;
                    }
                };
                if let Err(err) = client.select_recent_search(&term).await {
                    eprintln!("error: {err:#}");
                } else {
                    print_view(&settled_view(&client).await);
                }
            }
            _ if line.starts_with(":rm ") => {
                let id = line[":rm ".len()..].trim();
                client.remove_story(&StoryId::from(id)).await;
                print_view(&client.view().await);
            }
            _ if line.starts_with(":sort ") => {
                match line[":sort ".len()..].trim().parse::<SortKey>() {
                    Ok(key) => {
                        client.set_sort(key).await;
                        print_view(&client.view().await);
                    }
                    Err(err) => eprintln!("error: {err:#}"),
                }
            }
            _ if line.starts_with(':') => {
                eprintln!("unknown command '{line}'; try :help");
            }
            term => {
                if let Err(err) = client.submit_search(term).await {
                    eprintln!("error: {err:#}");
                } else {
                    print_view(&settled_view(&client).await);
                }
            }
        }
    }

    Ok(())
}

/// Waits until no request is in flight. Requests carry no timeout, so the
/// wait is bounded and falls back to the in-flight view.
async fn settled_view(client: &StoriesClient) -> SearchView {
    let settle = async {
        loop {
            let view = client.view().await;
            if !view.is_loading {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    };
    match tokio::time::timeout(Duration::from_secs(30), settle).await {
        Ok(view) => view,
        Err(_) => client.view().await,
    }
}

fn print_view(view: &SearchView) {
    if view.is_loading {
        println!("Loading ...");
        return;
    }
    if view.is_error {
        println!("Something went wrong with the last request; showing previous results.");
    }

    if view.items.is_empty() {
        println!("No stories for '{}'.", view.search_input);
    } else {
        println!("Stories for '{}':", view.search_input);
        for (index, story) in view.items.iter().enumerate() {
            println!("{:>2}. {} ({})", index + 1, story.title, story.url);
            println!(
                "    id={} by {}, {} comments, {} points",
                story.object_id, story.author, story.num_comments, story.points
            );
        }
    }

    if !view.recent_searches.is_empty() {
        println!("Recent searches: {}", view.recent_searches.join(", "));
    }
    if view.can_load_more {
        println!("(:more fetches the next page)");
    }
}

fn print_help() {
    println!("<term>          search for <term>");
    println!(":more           load the next page of the current search");
    println!(":rm <id>        remove a story from the list");
    println!(":recent         show recent searches");
    println!(":recent <n>     re-run the n-th recent search");
    println!(":sort <key>     sort by none|title|author|comments|points (repeat to reverse)");
    println!(":q              quit");
}
