//! Text rendering shared by the CLI and the interactive menu.

use crate::domain::{Profile, ProfileStats};
use crate::infrastructure::BackupEntry;
use chrono::{DateTime, Local, Utc};
use console::{pad_str, style, Alignment};
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

fn pad(text: &str, width: usize) -> String {
    pad_str(text, width, Alignment::Left, Some("…")).into_owned()
}

fn tag_list(profile: &Profile) -> String {
    profile.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ")
}

/// One line per profile: name, address, uses, last use, tags
pub fn profile_table(profiles: &[Profile]) -> String {
    let now = Utc::now();
    let name_width = profiles.iter().map(|p| p.name.chars().count()).max().unwrap_or(0).clamp(4, 24);
    let address_width = profiles.iter().map(|p| p.address().chars().count()).max().unwrap_or(0).clamp(7, 40);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {} {} {}",
        style(pad("NAME", name_width)).cyan().bold(),
        style(pad("ADDRESS", address_width)).cyan().bold(),
        style(pad("USES", 5)).cyan().bold(),
        style(pad("LAST USED", 14)).cyan().bold(),
        style("TAGS").cyan().bold(),
    );

    for profile in profiles {
        let last_used = profile
            .last_used
            .map(|at| relative_time(at, now))
            .unwrap_or_else(|| "never".to_string());
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            style(pad(&profile.name, name_width)).green(),
            pad(&profile.address(), address_width),
            pad(&profile.use_count.to_string(), 5),
            style(pad(&last_used, 14)).dim(),
            style(tag_list(profile)).cyan(),
        );
    }

    out
}

/// Every field of one profile
pub fn profile_details(profile: &Profile) -> String {
    let label = |name: &str| style(format!("{:<13}", name)).blue().bold();
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "{}", style(&profile.name).green().bold());
    let _ = writeln!(out, "  {} {}", label("Host:"), profile.host);
    let _ = writeln!(out, "  {} {}", label("User:"), profile.username);
    let _ = writeln!(out, "  {} {}", label("Port:"), profile.port);
    let _ = writeln!(out, "  {} {}", label("Key:"), optional(&profile.private_key_path));
    let _ = writeln!(out, "  {} {}", label("Jump host:"), optional(&profile.jump_host));
    let _ = writeln!(out, "  {} {}", label("Description:"), optional(&profile.description));
    let tags = tag_list(profile);
    let _ = writeln!(out, "  {} {}", label("Tags:"), if tags.is_empty() { "-".to_string() } else { tags });
    let _ = writeln!(out, "  {} {}", label("Created:"), local_time(profile.created_at));
    let _ = writeln!(out, "  {} {}", label("Last used:"), last_used(profile));
    let _ = writeln!(out, "  {} {}", label("Use count:"), profile.use_count);
    let _ = writeln!(out, "  {} {}", label("Id:"), style(&profile.id).dim());
    out
}

/// Usage of a single profile (`stats <name>`)
pub fn profile_usage(profile: &Profile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", style("Usage of").bold(), style(&profile.name).green().bold());
    let _ = writeln!(out, "   • Connections: {}", style(profile.use_count).cyan());
    let _ = writeln!(out, "   • Last used: {}", last_used(profile));
    let _ = writeln!(out, "   • Created: {}", local_time(profile.created_at));
    out
}

/// Aggregate statistics with a port histogram
pub fn stats_report(stats: &ProfileStats) -> String {
    let mut out = String::new();
    if stats.total == 0 {
        let _ = writeln!(out, "{} No profiles to analyze", style("!").yellow().bold());
        return out;
    }

    let _ = writeln!(out, "{}", style("General").bold());
    let _ = writeln!(out, "   • Total profiles: {}", style(stats.total).cyan());
    let _ = writeln!(out, "   • With SSH keys: {}", style(stats.with_keys).green());
    let _ = writeln!(out, "   • With jump hosts: {}", style(stats.with_jump_hosts).blue());
    let _ = writeln!(out, "   • Never used: {}", style(stats.never_used).yellow());
    let _ = writeln!(out, "   • Total connections: {}", style(stats.total_uses).cyan());
    if let Some(port) = stats.most_common_port() {
        let _ = writeln!(out, "   • Most common port: {}", style(port).cyan());
    }

    let _ = writeln!(out, "\n{}", style("Port distribution").bold());
    let max = stats.ports.values().copied().max().unwrap_or(1);
    for (port, count) in &stats.ports {
        let _ = writeln!(out, "   Port {:>5}: {} {}", port, style(bar(*count, max)).cyan(), count);
    }

    if !stats.tags.is_empty() {
        let _ = writeln!(out, "\n{}", style("Tags").bold());
        for (tag, count) in &stats.tags {
            let _ = writeln!(out, "   #{}: {}", tag, count);
        }
    }

    if !stats.most_used.is_empty() {
        let _ = writeln!(out, "\n{}", style("Most used").bold());
        for (rank, (name, count)) in stats.most_used.iter().enumerate() {
            let _ = writeln!(out, "   {}. {}: {}", rank + 1, name, style(format!("{} times", count)).green());
        }
    }

    out
}

/// Backup files, newest first
pub fn backup_list(entries: &[BackupEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{}  {}",
            style(entry.created_at.format("%Y-%m-%d %H:%M:%S")).dim(),
            entry.path.display()
        );
    }
    out
}

fn bar(count: usize, max: usize) -> String {
    let width = (count * BAR_WIDTH / max.max(1)).clamp(1, BAR_WIDTH);
    "█".repeat(width)
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn last_used(profile: &Profile) -> String {
    match profile.last_used {
        Some(at) => format!("{} ({})", local_time(at), relative_time(at, Utc::now())),
        None => "never".to_string(),
    }
}

/// "just now", "5 minutes ago", "3 days ago"
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let (value, unit) = match seconds {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 86_400 * 30 => (s / 86_400, "day"),
        s if s < 86_400 * 365 => (s / (86_400 * 30), "month"),
        s => (s / (86_400 * 365), "year"),
    };
    format!("{} {}{} ago", value, unit, if value == 1 { "" } else { "s" })
}
