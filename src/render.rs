//! Text rendering of the build outputs.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::pipeline::BuildOutcome;

const CUSTOM_RULE: &str = "# ----------------------------------------";

/// Render the blacklist: feed entries, then the dated custom section.
///
/// Within each section addresses come before networks; downstream ACL
/// includes rely on that order.
pub fn render_blacklist(outcome: &BuildOutcome, generated_at: &str) -> String {
    let mut out = String::new();
    for addr in &outcome.feed_addresses {
        let _ = writeln!(out, "{}", addr);
    }
    for net in &outcome.feed_networks {
        let _ = writeln!(out, "{}", net);
    }
    out.push_str("\n# ------------custom entries -------------\n");
    let _ = writeln!(out, "# Added on: {}", generated_at);
    out.push_str(CUSTOM_RULE);
    out.push_str("\n\n");
    out.push_str(&outcome.blacklist.to_text());
    out
}

/// One target country code per line, sorted.
pub fn render_country_whitelist(targets: &BTreeSet<String>) -> String {
    targets.iter().map(|code| format!("{}\n", code)).collect()
}
