use crate::commands::{
    run_documents_export, run_documents_list, run_fee_quote, run_grants_list, DocumentExportArgs,
    FeeQuoteArgs, GrantListArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use uncif_docs::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "UNCIF Document Services",
    about = "Quote documentation fees, generate organizational documents and serve the intake API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Documentation fee quotes
    Fees {
        #[command(subcommand)]
        command: FeesCommand,
    },
    /// Document templates and exports
    Documents {
        #[command(subcommand)]
        command: DocumentsCommand,
    },
    /// Grants listing
    Grants {
        #[command(subcommand)]
        command: GrantsCommand,
    },
    /// Walk through quotes, exports and submissions end to end
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum FeesCommand {
    /// Quote the fees for a documentation request
    Quote(FeeQuoteArgs),
}

#[derive(Subcommand, Debug)]
enum DocumentsCommand {
    /// List available templates with their fields and formats
    List,
    /// Fill a template and write the artifact to disk
    Export(DocumentExportArgs),
}

#[derive(Subcommand, Debug)]
enum GrantsCommand {
    /// Search and page through open grants
    List(GrantListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Fees {
            command: FeesCommand::Quote(args),
        } => run_fee_quote(args),
        Command::Documents {
            command: DocumentsCommand::List,
        } => run_documents_list(),
        Command::Documents {
            command: DocumentsCommand::Export(args),
        } => run_documents_export(args),
        Command::Grants {
            command: GrantsCommand::List(args),
        } => run_grants_list(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["uncif-docs-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn export_accepts_repeated_fields() {
        let cli = Cli::try_parse_from([
            "uncif-docs-api",
            "documents",
            "export",
            "--kind",
            "letter",
            "--format",
            "png",
            "--field",
            "recipient_name=Meera Iyer",
            "--field",
            "program=Rural Literacy",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Documents {
                command: DocumentsCommand::Export(args),
            }) => {
                assert_eq!(args.kind, "letter");
                assert_eq!(args.fields.len(), 2);
                assert_eq!(args.fields[1].0, "program");
            }
            other => panic!("expected documents export, got {other:?}"),
        }
    }

    #[test]
    fn fee_quote_requires_pages_and_category() {
        assert!(Cli::try_parse_from(["uncif-docs-api", "fees", "quote", "--pages", "4"]).is_err());
        let cli = Cli::try_parse_from([
            "uncif-docs-api",
            "fees",
            "quote",
            "--pages",
            "4",
            "--category",
            "founder",
        ])
        .expect("parses");
        assert!(matches!(
            cli.command,
            Some(Command::Fees {
                command: FeesCommand::Quote(_)
            })
        ));
    }
}
