//! Tailormade - 绘本生成客户端
//!
//! 子命令:
//! - session start|end: 浏览会话生命周期
//! - draft show|set|clear: 会话内表单草稿
//! - generate: 提交草稿并实时打印进度，ctrl-c 取消

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use tailormade::application::{BookApiPort, DraftSession, GenerationOrchestrator};
use tailormade::config::{load_config, load_config_from_path, print_config, AppConfig};
use tailormade::domain::book::{AgeRange, ArtStyle, GeneratedBook};
use tailormade::domain::draft::{Draft, DraftPatch};
use tailormade::infrastructure::{
    ActiveBook, BrowsingSession, FakeBookClient, HttpBookClient, StaticCredentials,
};

#[derive(Parser, Debug)]
#[command(name = "tailormade", version, about = "Generate illustrated colouring books")]
struct Cli {
    /// 配置文件路径（默认搜索 config.toml / config.local.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 继续已有的浏览会话
    #[arg(long, global = true, env = "TAILORMADE_SESSION")]
    session: Option<String>,

    /// 使用本地脚本化的生成服务
    #[arg(long, global = true)]
    fake: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 浏览会话
    #[command(subcommand)]
    Session(SessionCommand),

    /// 表单草稿
    #[command(subcommand)]
    Draft(DraftCommand),

    /// 用当前草稿生成绘本
    Generate(DraftArgs),
}

#[derive(Subcommand, Debug)]
enum SessionCommand {
    /// 新建会话并打印会话 id
    Start,
    /// 结束会话并删除其草稿
    End,
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    Show,
    /// 更新草稿中给出的字段
    Set(DraftArgs),
    /// 恢复默认草稿
    Clear,
}

#[derive(Args, Debug, Default)]
struct DraftArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    theme: Option<String>,

    #[arg(long)]
    page_count: Option<u8>,

    /// 3-5 | 6-9 | 10-12
    #[arg(long, value_parser = parse_age_range)]
    age_range: Option<AgeRange>,

    /// simple | standard | detailed
    #[arg(long, value_parser = parse_art_style)]
    art_style: Option<ArtStyle>,

    #[arg(long)]
    character_name: Option<String>,
}

impl From<DraftArgs> for DraftPatch {
    fn from(args: DraftArgs) -> Self {
        Self {
            title: args.title,
            theme: args.theme,
            page_count: args.page_count,
            age_range: args.age_range,
            art_style: args.art_style,
            character_name: args.character_name,
        }
    }
}

fn parse_age_range(s: &str) -> Result<AgeRange, String> {
    AgeRange::from_str(s).ok_or_else(|| format!("unknown age range '{}'", s))
}

fn parse_art_style(s: &str) -> Result<ArtStyle, String> {
    ArtStyle::from_str(s).ok_or_else(|| format!("unknown art style '{}'", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = match &cli.config {
        Some(path) => load_config_from_path(Some(path)),
        None => load_config(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    print_config(&config);

    match cli.command {
        Command::Session(SessionCommand::Start) => {
            let session = BrowsingSession::start(&config.session.root_dir)?;
            println!("{}", session.id());
        }
        Command::Session(SessionCommand::End) => {
            let session = resume_session(&cli.session, &config)?;
            let id = session.id();
            session.end()?;
            println!("Session {} ended", id);
        }
        Command::Draft(command) => {
            let session = resume_session(&cli.session, &config)?;
            let drafts = DraftSession::open(session.draft_store())?;
            match command {
                DraftCommand::Show => {}
                DraftCommand::Set(args) => {
                    drafts.update_draft(args.into())?;
                }
                DraftCommand::Clear => drafts.clear_draft()?,
            }
            print_draft(&drafts.draft());
        }
        Command::Generate(args) => {
            // 未指定会话时使用一次性会话，结束后删除
            let (session, ephemeral) = match &cli.session {
                Some(_) => (resume_session(&cli.session, &config)?, false),
                None => (BrowsingSession::start(&config.session.root_dir)?, true),
            };

            let result = generate(&config, &session, args.into(), cli.fake).await;

            if ephemeral {
                session.end()?;
            }
            result?;
        }
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("warn,tailormade={}", config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn resume_session(id: &Option<String>, config: &AppConfig) -> anyhow::Result<BrowsingSession> {
    let Some(id) = id else {
        bail!("No browsing session; run `tailormade session start` and pass --session <id>");
    };
    BrowsingSession::resume(&config.session.root_dir, id)
        .with_context(|| format!("Failed to resume session {}", id))
}

async fn generate(
    config: &AppConfig,
    session: &BrowsingSession,
    patch: DraftPatch,
    fake: bool,
) -> anyhow::Result<()> {
    let drafts = Arc::new(DraftSession::open(session.draft_store())?);
    if !patch.is_empty() {
        drafts.update_draft(patch)?;
    }
    let request = drafts.draft().to_request()?;

    let api: Arc<dyn BookApiPort> = if fake {
        Arc::new(FakeBookClient::demo(&request))
    } else {
        let credentials = Arc::new(StaticCredentials::from_option(config.api.token.clone()));
        let client = HttpBookClient::new(config.api.client_config(), credentials)?;
        if !client.health_check().await {
            tracing::warn!(base_url = %config.api.base_url, "Generation service health check failed");
        }
        Arc::new(client)
    };

    let sink = ActiveBook::new().arc();
    let orchestrator = GenerationOrchestrator::new(
        api,
        drafts,
        sink.clone(),
        config.generation.poll_policy(),
    )
    .with_cancellation(session.cancellation())
    .arc();

    // 进度输出
    let mut updates = orchestrator.subscribe();
    let progress = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if state.is_generating {
                eprintln!("[{:>3}%] {}", state.progress, state.status_message);
            }
        }
    });

    // ctrl-c 取消
    let canceller = orchestrator.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received interrupt, cancelling generation");
            canceller.cancel();
        }
    });

    let result = orchestrator.generate(request).await;
    interrupt.abort();
    progress.abort();

    match result {
        Ok(Some(book)) => {
            print_book(&book);
            Ok(())
        }
        Ok(None) => bail!("A generation is already in progress"),
        Err(e) => bail!("{}", e),
    }
}

fn print_draft(draft: &Draft) {
    println!("title:          {}", draft.title);
    println!("theme:          {}", draft.theme);
    println!("page_count:     {}", draft.page_count);
    println!("age_range:      {}", draft.age_range);
    println!("art_style:      {}", draft.art_style);
    println!("character_name: {}", draft.character_name);
}

fn print_book(book: &GeneratedBook) {
    println!("{} ({} pages)", book.title, book.pages.len());
    for page in &book.pages {
        println!("  {:>2}. {}", page.page_number, page.scene_description);
        println!("      {}", page.image_url);
    }
    println!("PDF: {}", book.pdf_url);
}
