//! Recent lines per (origin, channel).

use std::collections::{HashMap, VecDeque};

/// Origins tracked per channel before the least recently active is dropped.
pub const DEFAULT_MAX_ORIGINS: usize = 256;

#[derive(Debug, Default)]
struct ChannelLines {
    depth: usize,
    rings: HashMap<String, VecDeque<String>>,
    /// Origins by last activity, least recent first.
    recency: VecDeque<String>,
}

impl ChannelLines {
    fn touch(&mut self, origin: &str, max_origins: usize) {
        if let Some(pos) = self.recency.iter().position(|o| o == origin) {
            if let Some(o) = self.recency.remove(pos) {
                self.recency.push_back(o);
            }
            return;
        }
        while self.recency.len() >= max_origins {
            match self.recency.pop_front() {
                Some(evicted) => {
                    self.rings.remove(&evicted);
                }
                None => break,
            }
        }
        self.recency.push_back(origin.to_owned());
    }
}

/// Bounded history of the last lines each origin said in each channel.
///
/// Depth is fixed per channel at construction: the longest filter of the
/// channel decides how far back any match can look. At most `max_origins`
/// origins are kept per channel; a new origin past that drops the one that
/// spoke least recently.
#[derive(Debug)]
pub struct LineHistory {
    channels: HashMap<String, ChannelLines>,
    max_origins: usize,
}

impl Default for LineHistory {
    fn default() -> Self {
        Self::with_max_origins(DEFAULT_MAX_ORIGINS)
    }
}

impl LineHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_origins(max_origins: usize) -> Self {
        Self {
            channels: HashMap::new(),
            max_origins: max_origins.max(1),
        }
    }

    /// Keep up to `depth` lines per origin for `channel`.
    pub fn set_depth(&mut self, channel: &str, depth: usize) {
        self.channels.entry(channel.to_owned()).or_default().depth = depth;
    }

    /// Record a line. Channels without a depth keep nothing.
    pub fn push(&mut self, origin: &str, channel: &str, text: &str) {
        let Some(lines) = self.channels.get_mut(channel) else {
            return;
        };
        let depth = lines.depth;
        if depth == 0 {
            return;
        }

        lines.touch(origin, self.max_origins);
        let ring = lines
            .rings
            .entry(origin.to_owned())
            .or_insert_with(|| VecDeque::with_capacity(depth));
        if ring.len() == depth {
            ring.pop_front();
        }
        ring.push_back(text.to_owned());
    }

    /// The last `n` lines from `origin` in `channel`, oldest first. Shorter
    /// when fewer were recorded.
    pub fn window(&self, origin: &str, channel: &str, n: usize) -> Vec<&str> {
        let Some(ring) = self
            .channels
            .get(channel)
            .and_then(|lines| lines.rings.get(origin))
        else {
            return Vec::new();
        };
        let skip = ring.len().saturating_sub(n);
        ring.iter().skip(skip).map(String::as_str).collect()
    }

    /// Number of origins with recorded lines in `channel`.
    pub fn origins(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, |lines| lines.rings.len())
    }

    /// Forget every recorded line, keeping the configured depths.
    pub fn clear(&mut self) {
        for lines in self.channels.values_mut() {
            lines.rings.clear();
            lines.recency.clear();
        }
    }
}
