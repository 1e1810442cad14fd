use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use whisperlog_core::models::{Activity, Emotion, Language, Mood, VoiceStyle};

#[derive(Parser)]
#[command(name = "whisperlog")]
#[command(about = "Log angel number sightings and receive their interpretations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name for mirror and AI endpoints
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log a new sighting
    #[command(alias = "add")]
    Log(LogArgs),
    /// List recent sightings, newest first
    List {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one entry with its interpretation
    Show {
        /// Entry ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change fields of an existing entry
    Edit(EditArgs),
    /// Generate narration text for an entry's interpretation
    Speak {
        /// Entry ID or unique ID prefix
        id: String,
        /// Narration language (defaults to the saved preference)
        #[arg(long)]
        language: Option<Language>,
        /// Narration tone
        #[arg(long, default_value_t = VoiceStyle::default())]
        voice_style: VoiceStyle,
    },
    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        /// Entry ID or unique ID prefix
        id: String,
    },
    /// Export all entries
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Output file or directory (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Show how often numbers, emotions, activities and moods occur
    Analytics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clean up a note's grammar and wording
    Polish {
        /// Note text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show today's affirmation
    Affirmation {
        /// Generate a new one even if today's is cached
        #[arg(long)]
        refresh: bool,
    },
    /// Show or set the preferred interpretation language
    Language {
        #[command(subcommand)]
        command: Option<LanguageCommands>,
    },
    /// Reconcile the local cache with the remote mirror
    Sync,
    /// Follow the remote mirror and print each change until Ctrl-C
    Watch,
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// The number seen, as digits ("444") or words ("four four four")
    #[arg(required = true)]
    pub number: Vec<String>,
    /// How you felt
    #[arg(long)]
    pub emotion: Emotion,
    /// What you were doing
    #[arg(long)]
    pub activity: Activity,
    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
    /// Mood of the day
    #[arg(long)]
    pub mood: Option<Mood>,
    /// Interpretation language (defaults to the saved preference)
    #[arg(long)]
    pub language: Option<Language>,
    /// Polish the notes before saving
    #[arg(long)]
    pub polish: bool,
    /// Save without requesting an interpretation
    #[arg(long)]
    pub skip_interpretation: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    /// Entry ID or unique ID prefix
    pub id: String,
    /// New number
    #[arg(long)]
    pub number: Option<String>,
    #[arg(long)]
    pub emotion: Option<Emotion>,
    #[arg(long)]
    pub activity: Option<Activity>,
    /// Replace the notes
    #[arg(long, conflicts_with = "clear_notes")]
    pub notes: Option<String>,
    /// Remove the notes
    #[arg(long)]
    pub clear_notes: bool,
    #[arg(long, conflicts_with = "clear_mood")]
    pub mood: Option<Mood>,
    /// Remove the mood
    #[arg(long)]
    pub clear_mood: bool,
    /// Interpretation language (defaults to the entry's, then the saved preference)
    #[arg(long)]
    pub language: Option<Language>,
    /// Keep the existing interpretation
    #[arg(long)]
    pub skip_interpretation: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum LanguageCommands {
    /// Save the preferred language
    Set {
        language: Language,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update a profile
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Remote mirror base URL
        #[arg(long, value_name = "URL")]
        mirror_url: Option<String>,
        /// Remote mirror collection
        #[arg(long, value_name = "NAME")]
        mirror_collection: Option<String>,
        /// Remote mirror document
        #[arg(long, value_name = "NAME")]
        mirror_document: Option<String>,
        /// OpenAI-compatible API base URL
        #[arg(long, value_name = "URL")]
        ai_base_url: Option<String>,
        /// Completion model name
        #[arg(long, value_name = "MODEL")]
        ai_model: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Show the effective configuration
    Show {
        /// Profile to show (defaults to the active one)
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}
