//! Ask command - answer one question from the command line

use clap::Args;

use crate::domain::answer_cache::RequestContext;
use crate::domain::generation::Message;

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Cache partition to look up and record in
    #[arg(short, long)]
    pub usecase: Option<String>,

    /// Always generate, never read or write the cache
    #[arg(long)]
    pub no_cache: bool,

    /// The question; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,
}

impl AskArgs {
    pub fn question(&self) -> String {
        self.message.join(" ")
    }
}

/// Answer the question and print the reply on stdout
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let mut config = super::init_oneshot()?;

    if args.no_cache {
        config.cache.enabled = false;
    }

    let state = crate::create_app_state(&config).await?;
    let ctx = RequestContext::new(args.usecase.clone());

    let reply = state
        .responder
        .respond(&ctx, &[Message::user(args.question())])
        .await?;

    println!("{}", reply.content);

    if let Some(score) = reply.score {
        eprintln!("(served from cache, similarity {:.3})", score);
    }

    Ok(())
}
