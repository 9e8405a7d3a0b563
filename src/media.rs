/// Incremental paging of supplementary image and audio results
use serde::{Deserialize, Serialize};

/// Items appended per "load more" request.
pub const PAGE_SIZE: usize = 3;

/// One supplementary image result: the exportable source URL plus the
/// thumbnail shown in the results strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    pub thumb: String,
}

/// One pronunciation row, decoded from the `[speaker, origin, url, url]`
/// tuples the audio provider delivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pronunciation {
    pub speaker: String,
    pub origin: String,
    pub url: String,
}

/// Where the next page comes from. The two upstream panel variants disagree
/// on this (client-held list vs. a fresh host request per page), so both
/// strategies are kept and chosen per trigger control.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    /// The full result list is already on the client; page through it locally.
    Cached(Vec<MediaItem>),
    /// Each page is requested from the host, which answers asynchronously by
    /// appending rendered items.
    Host { term: String },
}

/// What a "load more" click should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStep {
    /// Render these items now; `exhausted` marks the final page.
    Page {
        items: Vec<MediaItem>,
        exhausted: bool,
    },
    /// A host request is needed; re-enable or finish the control when the
    /// delivery arrives.
    Requested { term: String },
    /// Nothing left; the control moves to its disabled terminal state.
    Exhausted,
}

/// Cursor into one result list. The cursor is simply the count of items
/// already rendered into the container.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaLoader {
    source: MediaSource,
    rendered: usize,
    exhausted: bool,
}

impl MediaLoader {
    pub fn new(source: MediaSource) -> MediaLoader {
        MediaLoader {
            source,
            rendered: 0,
            exhausted: false,
        }
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Advance by one page.
    pub fn next_page(&mut self) -> LoadStep {
        if self.exhausted {
            return LoadStep::Exhausted;
        }
        match &self.source {
            MediaSource::Cached(items) => {
                let start = self.rendered.min(items.len());
                let page: Vec<MediaItem> = items[start..]
                    .iter()
                    .take(PAGE_SIZE)
                    .cloned()
                    .collect();
                if page.is_empty() {
                    self.exhausted = true;
                    return LoadStep::Exhausted;
                }
                self.rendered += page.len();
                let exhausted = self.rendered >= items.len();
                self.exhausted = exhausted;
                LoadStep::Page { items: page, exhausted }
            }
            MediaSource::Host { term } => LoadStep::Requested { term: term.clone() },
        }
    }

    /// Account for a host delivery. An empty (or unparseable, hence empty)
    /// delivery means the source ran dry, not that something failed.
    pub fn absorb_host_delivery(&mut self, appended: usize) {
        if appended == 0 {
            self.exhausted = true;
        } else {
            self.rendered += appended;
        }
    }
}

/// Decode the provider's pronunciation rows. Malformed data degrades to an
/// empty list, which the panel shows as "no results".
pub fn parse_pronunciations(raw: &str) -> Vec<Pronunciation> {
    let rows: Vec<Vec<String>> = match serde_json::from_str(raw) {
        Ok(rows) => rows,
        Err(err) => {
            log::warn!("unparseable pronunciation data: {}", err);
            return Vec::new();
        }
    };
    rows.into_iter()
        .filter_map(|mut row| {
            if row.len() < 3 {
                return None;
            }
            let url = row.remove(2);
            let origin = row.remove(1);
            let speaker = row.remove(0);
            Some(Pronunciation { speaker, origin, url })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<MediaItem> {
        (0..n)
            .map(|i| MediaItem {
                url: format!("https://img.example/{}.jpg", i),
                thumb: format!("https://img.example/{}_t.jpg", i),
            })
            .collect()
    }

    #[test]
    fn test_full_page_then_remainder() {
        let mut loader = MediaLoader::new(MediaSource::Cached(items(5)));
        match loader.next_page() {
            LoadStep::Page { items, exhausted } => {
                assert_eq!(items.len(), 3);
                assert!(!exhausted);
            }
            other => panic!("expected a full page, got {:?}", other),
        }
        match loader.next_page() {
            LoadStep::Page { items, exhausted } => {
                assert_eq!(items.len(), 2);
                assert!(exhausted);
            }
            other => panic!("expected the remainder, got {:?}", other),
        }
    }

    #[test]
    fn test_requesting_past_the_end_renders_nothing() {
        let mut loader = MediaLoader::new(MediaSource::Cached(items(3)));
        loader.next_page();
        assert_eq!(loader.next_page(), LoadStep::Exhausted);
        assert_eq!(loader.next_page(), LoadStep::Exhausted);
        assert!(loader.is_exhausted());
        assert_eq!(loader.rendered(), 3);
    }

    #[test]
    fn test_empty_cached_list_is_immediately_exhausted() {
        let mut loader = MediaLoader::new(MediaSource::Cached(Vec::new()));
        assert_eq!(loader.next_page(), LoadStep::Exhausted);
    }

    #[test]
    fn test_host_strategy_requests_each_page() {
        let mut loader = MediaLoader::new(MediaSource::Host {
            term: "犬".to_string(),
        });
        assert_eq!(
            loader.next_page(),
            LoadStep::Requested { term: "犬".to_string() }
        );
        loader.absorb_host_delivery(3);
        assert_eq!(loader.rendered(), 3);
        assert_eq!(
            loader.next_page(),
            LoadStep::Requested { term: "犬".to_string() }
        );
    }

    #[test]
    fn test_empty_host_delivery_exhausts() {
        let mut loader = MediaLoader::new(MediaSource::Host {
            term: "犬".to_string(),
        });
        loader.absorb_host_delivery(0);
        assert!(loader.is_exhausted());
        assert_eq!(loader.next_page(), LoadStep::Exhausted);
    }

    #[test]
    fn test_parse_pronunciations() {
        let raw = r#"[["alice","Japan","https://a/1.ogg","https://a/1.ogg"],
                      ["bob","Tokyo, Japan","https://a/2.ogg","https://a/2.ogg"]]"#;
        let rows = parse_pronunciations(raw);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].speaker, "alice");
        assert_eq!(rows[1].origin, "Tokyo, Japan");
        assert_eq!(rows[1].url, "https://a/2.ogg");
    }

    #[test]
    fn test_parse_pronunciations_tolerates_garbage() {
        assert!(parse_pronunciations("not json").is_empty());
        assert!(parse_pronunciations("[[\"only-speaker\"]]").is_empty());
        assert!(parse_pronunciations("[]").is_empty());
    }
}
