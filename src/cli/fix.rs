//! Fix subcommand: set one key in one stanza of a local file.

use crate::artifact::Artifact;
use clap::Args;

/// Arguments for the fix subcommand
#[derive(Args, Debug)]
pub struct FixArgs {
    /// File to patch
    pub file: String,

    /// Stanza holding the key
    pub stanza: String,

    /// Key to replace
    pub key: String,

    /// New value
    pub value: String,

    /// Print the result instead of writing it back
    #[arg(long)]
    pub dry_run: bool,
}

impl FixArgs {
    /// Replace the key in the named stanza of `artifact`.
    ///
    /// Works on a whole conf file or on a single stanza. Returns `false`
    /// when the stanza or key is absent.
    pub fn apply(&self, artifact: &mut Artifact) -> bool {
        if let Some(stanza) = artifact.find_mut(&self.stanza) {
            return stanza.fix(&self.key, self.value.as_str());
        }
        if artifact.name() == Some(self.stanza.as_str()) {
            return artifact.fix(&self.key, self.value.as_str());
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(stanza: &str, key: &str, value: &str) -> FixArgs {
        FixArgs {
            file: "inputs.conf".to_string(),
            stanza: stanza.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            dry_run: true,
        }
    }

    #[test]
    fn test_apply_conf() {
        let mut conf = Artifact::for_file(
            "inputs.conf",
            "[monitor:///var/log]\nindex = main\n\n[script://run.sh]\nindex = main\n",
        );
        assert!(args("script://run.sh", "index", "ops").apply(&mut conf));
        assert_eq!(
            conf.print(),
            "[monitor:///var/log]\nindex = main\n\n[script://run.sh]\nindex = ops\n"
        );
    }

    #[test]
    fn test_apply_single_stanza() {
        let mut ini = Artifact::new("[ui]\nlabel = Search\n");
        assert!(args("ui", "label", "Find").apply(&mut ini));
        assert_eq!(ini.get("label").as_deref(), Some("Find"));
    }

    #[test]
    fn test_apply_missing() {
        let mut conf = Artifact::for_file("app.conf", "[ui]\nlabel = Search\n");
        assert!(!args("ui", "missing", "x").apply(&mut conf));
        assert!(!args("launcher", "label", "x").apply(&mut conf));
        assert_eq!(conf.find("ui").and_then(|s| s.get("label")).as_deref(), Some("Search"));
    }
}
