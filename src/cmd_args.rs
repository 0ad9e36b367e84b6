use std::ffi::OsString;

use crate::config::SyncFailurePolicy;
pub use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct ClapArgs {
    /// Profile name
    /// Optional. Profile section to load from the profile file. Default is 'default'.
    /// If the profile is not configured, a blank profile pointing at localhost is used.
    #[clap(short = 'p', long, default_value = "default", help = "profile name")]
    profile: String,

    /// Base URL
    /// Optional. Overrides the base_url of the profile.
    #[clap(short = 'b', long, help = "API base URL")]
    base_url: Option<String>,

    /// Sync failure policy
    /// Optional. Overrides the on_sync_failure of the profile.
    #[clap(long, value_enum, help = "what to do when a sync call fails")]
    on_sync_failure: Option<SyncFailurePolicy>,

    /// Verbose mode
    /// Optional. Log at debug level.
    #[clap(
        short = 'v',
        long,
        help = "Log debug messages",
        default_value = "false"
    )]
    verbose: bool,
}

#[derive(Debug, Clone)]
pub struct CommandLineArgs {
    profile: String,
    base_url: Option<String>,
    on_sync_failure: Option<SyncFailurePolicy>,
    verbose: bool,
}

impl CommandLineArgs {
    pub fn parse() -> Self {
        Self::from_clap(ClapArgs::parse())
    }

    pub fn parse_from<I, T>(itr: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from_clap(ClapArgs::parse_from(itr))
    }

    fn from_clap(args: ClapArgs) -> Self {
        Self {
            profile: args.profile,
            base_url: args.base_url,
            on_sync_failure: args.on_sync_failure,
            verbose: args.verbose,
        }
    }

    pub fn profile(&self) -> &String {
        &self.profile
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn on_sync_failure(&self) -> Option<SyncFailurePolicy> {
        self.on_sync_failure
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_args_profile_only() {
        let args = CommandLineArgs::parse_from(["program", "--profile", "test"]);
        assert_eq!(args.profile(), "test");
        assert!(!args.verbose());
        assert_eq!(args.base_url(), None);
    }

    #[test]
    fn test_parse_args_short_flags() {
        let args = CommandLineArgs::parse_from(["program", "-p", "ward", "-b", "http://x/", "-v"]);
        assert_eq!(args.profile(), "ward");
        assert_eq!(args.base_url(), Some("http://x/"));
        assert!(args.verbose());
    }

    #[test]
    fn test_parse_sync_failure_policy() {
        let args = CommandLineArgs::parse_from(["program", "--on-sync-failure", "reload"]);
        assert_eq!(args.on_sync_failure(), Some(SyncFailurePolicy::Reload));
    }

    #[test]
    fn test_default_values() {
        let args = CommandLineArgs::parse_from(["program"]);
        assert_eq!(args.profile(), "default");
        assert!(!args.verbose());
        assert_eq!(args.on_sync_failure(), None);
    }
}
