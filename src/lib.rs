pub mod agent;
pub mod cli;
pub mod config;
pub mod http;
pub mod knowledge;
pub mod llm;
pub mod notify;
pub mod record;

use agent::{ChatAgent, build_system_prompt};
use anyhow::{Result, anyhow};
use cli::{CliArgs, run_repl};
use config::AppConfig;
use http::client::HttpClient;
use http::debug::HttpDebugConfig;
use knowledge::BusinessKnowledge;
use llm::openai::OpenAiProvider;
use notify::PushoverNotifier;
use record::{FeedbackRecorder, InterestRecorder};

pub async fn run(args: CliArgs) -> Result<()> {
    let config = if let Some(path) = args.config.as_deref() {
        AppConfig::load_with_path(Some(path))?
    } else {
        AppConfig::load()?
    };

    let http = HttpClient::new(
        reqwest::Client::new(),
        HttpDebugConfig::from_verbose(args.verbose),
    );

    let knowledge = BusinessKnowledge::load(&config.knowledge_dir);
    let system_prompt = build_system_prompt(&knowledge);

    let provider = OpenAiProvider::new(
        http.clone(),
        config.openai_api_key,
        config.openai_model,
        config.openai_base_url,
    )
    .map_err(|err| anyhow!("Failed to configure completion provider: {err}"))?;

    let notifier = PushoverNotifier::new(
        http,
        config.pushover_user_key,
        config.pushover_token,
        config.pushover_url,
    );
    let interest = InterestRecorder::new(config.leads_log, notifier.clone());
    let feedback = FeedbackRecorder::new(config.feedback_log, notifier);

    let agent = ChatAgent::new(provider, interest, feedback, system_prompt);
    run_repl(&agent).await
}
