use crate::domain::models::Profile;
use std::collections::BTreeMap;

/// How many profiles make the "most used" list
pub const TOP_USED: usize = 5;

/// Aggregate figures over a profile snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileStats {
    pub total: usize,
    pub with_keys: usize,
    pub with_jump_hosts: usize,
    pub never_used: usize,
    pub total_uses: u64,
    /// Port -> number of profiles, ascending by port
    pub ports: BTreeMap<u16, usize>,
    /// Tag -> number of profiles carrying it
    pub tags: BTreeMap<String, usize>,
    /// Highest use counts first, only profiles used at least once
    pub most_used: Vec<(String, u64)>,
}

impl ProfileStats {
    pub fn compute(profiles: &[Profile]) -> Self {
        let mut stats = Self {
            total: profiles.len(),
            ..Self::default()
        };

        for profile in profiles {
            if profile.private_key_path.is_some() {
                stats.with_keys += 1;
            }
            if profile.jump_host.is_some() {
                stats.with_jump_hosts += 1;
            }
            if profile.use_count == 0 {
                stats.never_used += 1;
            }
            stats.total_uses += profile.use_count;
            *stats.ports.entry(profile.port).or_insert(0) += 1;
            for tag in &profile.tags {
                *stats.tags.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        let mut used: Vec<&Profile> = profiles.iter().filter(|p| p.use_count > 0).collect();
        used.sort_by(|a, b| b.use_count.cmp(&a.use_count));
        stats.most_used = used
            .into_iter()
            .take(TOP_USED)
            .map(|p| (p.name.clone(), p.use_count))
            .collect();

        stats
    }

    /// Most frequent port; ties go to the lowest port number
    pub fn most_common_port(&self) -> Option<u16> {
        self.ports
            .iter()
            .fold(None, |best: Option<(u16, usize)>, (&port, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((port, count)),
            })
            .map(|(port, _)| port)
    }
}
