use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use promptshelf::cli::{
    AuthCommands, ListOptions, PromptFields, SortArg, load_config, run_auth_login, run_config,
    run_auth_logout, run_auth_status, run_init, run_prompt_add, run_prompt_edit,
    run_prompt_list, run_prompt_models, run_prompt_rm, run_prompt_show,
};
use promptshelf::types::Provider;

#[derive(Parser)]
#[command(name = "promptshelf")]
#[command(about = "Keep a library of LLM prompts in your own GitHub repository", long_about = None)]
struct Cli {
    /// GitHub API base URL
    #[arg(long, global = true, env = "PROMPTSHELF_API_URL")]
    api_url: Option<String>,

    /// Name of the library repository
    #[arg(long, global = true, env = "PROMPTSHELF_REPO")]
    repo: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Create the library repository if it does not exist
    Init,

    /// Show or change client settings
    Config {
        /// Branch to read and commit to (empty string resets to the default branch)
        #[arg(long)]
        branch: Option<String>,

        /// Request timeout in seconds (0 removes the timeout)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Also persist --api-url and --repo
        #[arg(long)]
        save: bool,
    },

    /// List prompts
    #[command(alias = "ls")]
    List {
        /// Case-insensitive text to look for in titles, descriptions and tags
        #[arg(long, short)]
        search: Option<String>,

        /// Only prompts carrying this tag (repeatable, any match)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Only prompts for this provider (repeatable, any match)
        #[arg(long = "provider")]
        providers: Vec<Provider>,

        /// Sort key
        #[arg(long, value_enum, default_value = "updated")]
        sort: SortArg,

        /// Sort ascending
        #[arg(long, conflicts_with = "desc")]
        asc: bool,

        /// Sort descending (the default)
        #[arg(long)]
        desc: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one prompt with its body
    Show {
        /// Prompt id or the tail of one
        id: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a prompt
    Add {
        #[command(flatten)]
        fields: PromptFields,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Edit a prompt
    Edit {
        /// Prompt id or the tail of one (picked interactively when omitted)
        id: Option<String>,

        #[command(flatten)]
        fields: PromptFields,

        /// Remove existing tags before applying --tag
        #[arg(long)]
        clear_tags: bool,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// Delete a prompt
    #[command(alias = "delete")]
    Rm {
        /// Prompt id or the tail of one (picked interactively when omitted)
        id: Option<String>,

        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },

    /// List the models offered for each provider
    Models {
        /// Only this provider
        #[arg(long)]
        provider: Option<Provider>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("promptshelf=info".parse()?))
        .init();

    let cli = Cli::parse();

    if let Commands::Models { provider, json } = cli.command {
        return run_prompt_models(provider, json);
    }

    let config = load_config(cli.api_url, cli.repo)?;

    match cli.command {
        Commands::Auth { command } => match command {
            AuthCommands::Login {
                token,
                non_interactive,
            } => run_auth_login(&config, token, non_interactive).await?,
            AuthCommands::Logout => run_auth_logout()?,
            AuthCommands::Status => run_auth_status(&config)?,
        },
        Commands::Init => run_init(&config).await?,
        Commands::Config {
            branch,
            timeout_secs,
            save,
        } => run_config(config, branch, timeout_secs, save)?,
        Commands::List {
            search,
            tags,
            providers,
            sort,
            asc,
            desc: _,
            json,
        } => {
            run_prompt_list(
                &config,
                ListOptions {
                    search,
                    tags,
                    providers,
                    sort,
                    ascending: asc,
                    json,
                },
            )
            .await?;
        }
        Commands::Show { id, json } => run_prompt_show(&config, &id, json).await?,
        Commands::Add {
            fields,
            non_interactive,
        } => run_prompt_add(&config, fields, non_interactive).await?,
        Commands::Edit {
            id,
            fields,
            clear_tags,
            non_interactive,
        } => run_prompt_edit(&config, id, fields, clear_tags, non_interactive).await?,
        Commands::Rm {
            id,
            yes,
            non_interactive,
        } => run_prompt_rm(&config, id, yes, non_interactive).await?,
        Commands::Models { .. } => {}
    }

    Ok(())
}
