use std::path::PathBuf;

use cadmin_core::duration::CourseDuration;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cadmin", version, about = "Certification program admin console")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// Log in as an admin and keep the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Print the courses and their modules
    Catalog {
        #[arg(long)]
        json: bool,
    },
    /// Register a student and export the certificate QR code
    Add(AddArgs),
    /// Look a student up by roll number and date of birth
    Search(LookupArgs),
    /// List all students grouped by course
    List {
        #[arg(long)]
        json: bool,
    },
    /// Edit a listed record in place
    Edit(EditArgs),
    /// Change name, course or duration of a saved record; modules follow the course
    Amend(AmendArgs),
    /// Delete a listed record
    Delete {
        /// Backend id of the record
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Export the QR code of a saved record
    Qr {
        #[command(flatten)]
        lookup: LookupArgs,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

/// Fields of a new record. Missing fields are reported by the form, not
/// by argument parsing.
#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub roll_no: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    /// `YYYY-MM-DD` or `DD-MM-YYYY`
    #[arg(long)]
    pub dob: Option<String>,
    #[arg(long)]
    pub course: Option<String>,
    /// Module to check; repeat for several. Defaults to the course's
    /// modules when `MODULE_SELECT=all`.
    #[arg(long = "module")]
    pub modules: Vec<String>,
    /// e.g. `10 Days`, `3 Months`, or a month count
    #[arg(long)]
    pub duration: Option<CourseDuration>,
    /// Directory for the QR image
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct LookupArgs {
    #[arg(long)]
    pub roll_no: String,
    #[arg(long)]
    pub dob: String,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Backend id of the record
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub course: Option<String>,
    /// Replace the checked modules; repeat for several
    #[arg(long = "module")]
    pub modules: Vec<String>,
    #[arg(long)]
    pub duration: Option<CourseDuration>,
}

#[derive(Debug, Args)]
pub struct AmendArgs {
    #[command(flatten)]
    pub lookup: LookupArgs,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub course: Option<String>,
    #[arg(long)]
    pub duration: Option<CourseDuration>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_collects_repeated_modules() {
        let cli = Cli::try_parse_from([
            "cadmin", "add", "--roll-no", "R1", "--module", "HTML", "--module", "CSS",
            "--duration", "3 Months",
        ])
        .unwrap();
        let Cmd::Add(args) = cli.cmd else {
            panic!("expected add");
        };
        assert_eq!(args.modules, ["HTML", "CSS"]);
        assert_eq!(args.duration, Some(CourseDuration::Months(3)));
        assert_eq!(args.name, None);
    }

    #[test]
    fn bad_duration_is_a_parse_error() {
        assert!(Cli::try_parse_from(["cadmin", "add", "--duration", "forever"]).is_err());
    }

    #[test]
    fn delete_accepts_short_yes() {
        let cli = Cli::try_parse_from(["cadmin", "delete", "abc", "-y"]).unwrap();
        assert!(matches!(cli.cmd, Cmd::Delete { ref id, yes: true } if id == "abc"));
    }
}
