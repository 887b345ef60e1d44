//! CLI for publishing one part to the shop library.
//!
//! Resolves the drawing package in the given (or current) directory, stamps
//! the QR, writes the per-part page, then runs an advisory git check against
//! the publish root. Git trouble never fails a publish — it only nudges.

use partpublisher::git::{self, GitCli, Vcs};
use partpublisher::interact::{Console, Interact};
use partpublisher::{PublishConfig, Publisher, Result};
use std::path::PathBuf;
use std::{env, process};

fn main() {
    let args: Vec<String> = env::args().collect();
    let cli = CliArgs::parse(&args);

    if cli.help {
        print_usage(&args[0]);
        process::exit(0);
    }

    let start_dir = match cli.start_dir {
        Some(dir) => dir,
        None => env::current_dir().unwrap_or_else(|e| {
            eprintln!("❌ Cannot determine current directory: {e}");
            process::exit(1);
        }),
    };

    let root = match cli
        .root
        .or_else(|| env::var_os("SHOP_LIBRARY_ROOT").map(PathBuf::from))
    {
        Some(root) => root,
        None => {
            eprintln!("❌ No publish root. Pass --root <dir> or set SHOP_LIBRARY_ROOT.");
            process::exit(1);
        }
    };

    let config = PublishConfig::new(root);
    match run_publish(config, start_dir) {
        Ok(()) => println!("\nDONE ✅"),
        Err(e) => {
            eprintln!("\n❌ Error: {e}");
            process::exit(1);
        }
    }
}

/// Parsed command line. Flags and their values are consumed first; the
/// start directory is the first argument left over, so `publish --root x`
/// still defaults the start directory to the current directory.
#[derive(Debug, Default)]
struct CliArgs {
    start_dir: Option<PathBuf>,
    root: Option<PathBuf>,
    help: bool,
}

impl CliArgs {
    fn parse(args: &[String]) -> Self {
        let mut cli = Self::default();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-h" | "--help" => cli.help = true,
                "--root" => cli.root = iter.next().map(PathBuf::from),
                other => {
                    if cli.start_dir.is_none() {
                        cli.start_dir = Some(PathBuf::from(other));
                    }
                }
            }
        }
        cli
    }
}

fn print_usage(program_name: &str) {
    println!("📄 partpublisher - QR-stamped part page publisher");
    println!();
    println!("USAGE:");
    println!("    {program_name} [start_dir] [--root <publish_root>]");
    println!();
    println!("ARGUMENTS:");
    println!("    [start_dir]      Part working directory (default: current directory)");
    println!();
    println!("OPTIONS:");
    println!("    --root <dir>     Publish root (else SHOP_LIBRARY_ROOT env var)");
    println!("    -h, --help       Show this help message");
    println!();
    println!("This tool will:");
    println!("  • Find the newest drawing PDF (and STEP file) in the start directory");
    println!("  • Generate or reuse the part's QR code");
    println!("  • Stamp the QR next to the title block on page 1");
    println!("  • Refresh the Autodesk Viewer link and the part's web page");
}

fn run_publish(config: PublishConfig, start_dir: PathBuf) -> Result<()> {
    println!("START  : {}", start_dir.display());

    let root = config.publish_root.clone();
    let mut console = Console;

    let outcome = Publisher::new(config).publish(&start_dir, &mut console)?;

    println!("\nPage URL   : {}", outcome.page_url);
    println!("Repo folder: {}", outcome.output_dir.display());

    git_advisory(&root, &mut console);
    Ok(())
}

/// Post-publish git status check. Wrapped so any failure — git missing, not
/// a repo, network down during fetch — degrades to an advisory message.
fn git_advisory(root: &std::path::Path, interact: &mut dyn Interact) {
    let git = GitCli::new(root);

    match git.is_clean() {
        Err(e) => {
            eprintln!("\n⚠ Git check failed (not fatal): {e}");
            eprintln!("   You can commit and push manually.");
        }
        Ok(false) => {
            println!("\n⚠ Git: You have uncommitted changes.");
            println!("   Open GitHub Desktop, review, then COMMIT.");
            git::nudge_desktop_client(root);
        }
        Ok(true) => match git.is_ahead() {
            Ok(true) => {
                println!("\n✅ Git: Clean working tree, but commits are not pushed yet.");
                if interact.ask_yes_no("Unpushed commits detected. Push to GitHub now? (y/n): ") {
                    match git.push() {
                        Ok(()) => println!("✅ Pushed to GitHub."),
                        Err(e) => eprintln!("⚠ Push failed: {e}"),
                    }
                } else {
                    println!("OK — not pushing yet.");
                    git::nudge_desktop_client(root);
                }
            }
            Ok(false) => println!("\n✅ Git: Everything is already pushed."),
            Err(e) => eprintln!("\n⚠ Git check failed (not fatal): {e}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> CliArgs {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        CliArgs::parse(&args)
    }

    #[test]
    fn root_flag_alone_leaves_start_dir_unset() {
        let cli = parse(&["publish", "--root", "/srv/shop-library"]);
        assert_eq!(cli.start_dir, None);
        assert_eq!(cli.root, Some(PathBuf::from("/srv/shop-library")));
        assert!(!cli.help);
    }

    #[test]
    fn positional_and_root_parse_in_either_order() {
        let cli = parse(&["publish", "/work/PN-77", "--root", "/srv/lib"]);
        assert_eq!(cli.start_dir, Some(PathBuf::from("/work/PN-77")));
        assert_eq!(cli.root, Some(PathBuf::from("/srv/lib")));

        let cli = parse(&["publish", "--root", "/srv/lib", "/work/PN-77"]);
        assert_eq!(cli.start_dir, Some(PathBuf::from("/work/PN-77")));
        assert_eq!(cli.root, Some(PathBuf::from("/srv/lib")));
    }

    #[test]
    fn help_flag_is_recognized_anywhere() {
        assert!(parse(&["publish", "-h"]).help);
        assert!(parse(&["publish", "/work", "--help"]).help);
    }

    #[test]
    fn bare_invocation_parses_empty() {
        let cli = parse(&["publish"]);
        assert_eq!(cli.start_dir, None);
        assert_eq!(cli.root, None);
        assert!(!cli.help);
    }
}
