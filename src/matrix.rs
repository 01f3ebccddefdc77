//! Built-in monitor matrix.
//!
//! Probes a fixed set of countries against the home page and a content page,
//! as a regular browser and as Googlebot, plus a handful of special cases
//! (missing or empty country header, protected and SEO paths). Nothing is
//! evaluated; the report only records what the server did. In the watch loop
//! a row counts as passing when the server answered at all.

use chrono::{DateTime, Local};
use futures::stream::{self, StreamExt};
use log::info;

use crate::config::{COUNTRY_HEADER, GOOGLEBOT_USER_AGENT};
use crate::error_handling::LoadError;
use crate::filter::{FilterState, Summary};
use crate::probe::{ProbeOutcome, Prober};
use crate::watch::{Report, SuiteRunner};

/// Countries probed by the matrix, as `(code, display name)`.
///
/// Codes are sent uppercased as written; `UK` is not remapped here.
pub const COUNTRIES: [(&str, &str); 14] = [
    ("us", "United States"),
    ("uk", "United Kingdom"),
    ("au", "Australia"),
    ("at", "Austria"),
    ("ca", "Canada"),
    ("fr", "France"),
    ("de", "Germany"),
    ("ie", "Ireland"),
    ("it", "Italy"),
    ("ch", "Switzerland"),
    ("es", "Spain"),
    ("lu", "Luxembourg"),
    ("li", "Liechtenstein"),
    ("jp", "Japan"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    /// Country name, or the special case name
    pub label: String,
    pub url: String,
    pub outcome: ProbeOutcome,
}

impl MatrixRow {
    /// `false` when the request never got a response.
    pub fn reached(&self) -> bool {
        self.outcome.status != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixSection {
    pub title: String,
    pub rows: Vec<MatrixRow>,
}

#[derive(Debug, Clone, Default)]
pub struct MatrixReport {
    pub sections: Vec<MatrixSection>,
    pub last_update: DateTime<Local>,
}

impl MatrixReport {
    fn rows(&self) -> impl Iterator<Item = &MatrixRow> {
        self.sections.iter().flat_map(|section| &section.rows)
    }
}

impl Report for MatrixReport {
    /// Keeps every section, dropping hidden rows from each.
    fn filtered(&self, filter: FilterState) -> Self {
        let sections = self
            .sections
            .iter()
            .map(|section| MatrixSection {
                title: section.title.clone(),
                rows: section
                    .rows
                    .iter()
                    .filter(|row| {
                        !(filter.hide_fails && !row.reached())
                            && !(filter.hide_passes && row.reached())
                    })
                    .cloned()
                    .collect(),
            })
            .collect();
        MatrixReport {
            sections,
            last_update: self.last_update,
        }
    }

    fn summary(&self) -> Summary {
        Summary {
            passed: self.rows().filter(|row| row.reached()).count(),
            total: self.rows().count(),
        }
    }
}

/// One probe of the matrix.
enum MatrixProbe {
    Country {
        label: &'static str,
        url: String,
        code: &'static str,
        user_agent: Option<&'static str>,
    },
    Special {
        label: &'static str,
        url: String,
        headers: Vec<(String, String)>,
    },
}

impl MatrixProbe {
    async fn run(self, prober: &Prober) -> MatrixRow {
        match self {
            MatrixProbe::Country {
                label,
                url,
                code,
                user_agent,
            } => MatrixRow {
                label: label.to_string(),
                outcome: prober.probe(&url, code, user_agent).await,
                url,
            },
            MatrixProbe::Special {
                label,
                url,
                headers,
            } => MatrixRow {
                label: label.to_string(),
                outcome: prober.probe_with_headers(&url, &headers).await,
                url,
            },
        }
    }
}

fn country_probes(url: &str, user_agent: Option<&'static str>) -> Vec<MatrixProbe> {
    COUNTRIES
        .iter()
        .map(|&(code, label)| MatrixProbe::Country {
            label,
            url: url.to_string(),
            code,
            user_agent,
        })
        .collect()
}

fn special_probes(base_url: &str) -> Vec<MatrixProbe> {
    let country = |code: &str| vec![(COUNTRY_HEADER.to_string(), code.to_string())];
    vec![
        MatrixProbe::Special {
            label: "No Country Set",
            url: format!("{base_url}/"),
            headers: Vec::new(),
        },
        MatrixProbe::Special {
            label: "Empty Country Code",
            url: format!("{base_url}/"),
            headers: country(""),
        },
        MatrixProbe::Special {
            label: "WordPress Admin",
            url: format!("{base_url}/wp-admin/"),
            headers: country("DE"),
        },
        MatrixProbe::Special {
            label: "Robots.txt",
            url: format!("{base_url}/robots.txt"),
            headers: country("DE"),
        },
        MatrixProbe::Special {
            label: "Sitemap",
            url: format!("{base_url}/sitemap_index.xml"),
            headers: country("DE"),
        },
    ]
}

/// Section titles and their probes, in display order.
fn plan(base_url: &str) -> Vec<(String, Vec<MatrixProbe>)> {
    let base_url = base_url.trim_end_matches('/');
    let home = format!("{base_url}/");
    let content = format!("{base_url}/test-content");
    vec![
        (
            format!("Home Page - Regular Users ({home})"),
            country_probes(&home, None),
        ),
        (
            format!("Home Page - Google Bot ({home})"),
            country_probes(&home, Some(GOOGLEBOT_USER_AGENT)),
        ),
        (
            format!("Test Content - Regular Users ({content})"),
            country_probes(&content, None),
        ),
        (
            format!("Test Content - Google Bot ({content})"),
            country_probes(&content, Some(GOOGLEBOT_USER_AGENT)),
        ),
        ("Special Cases".to_string(), special_probes(base_url)),
    ]
}

/// Probes the whole matrix against `base_url`.
///
/// At most `max_concurrency` probes run at a time. Rows keep the order of
/// [`COUNTRIES`] and the special case list.
pub async fn run_matrix(prober: &Prober, base_url: &str, max_concurrency: usize) -> MatrixReport {
    let mut sections = Vec::new();
    for (title, probes) in plan(base_url) {
        let rows: Vec<MatrixRow> = stream::iter(probes)
            .map(|probe| probe.run(prober))
            .buffered(max_concurrency.max(1))
            .collect()
            .await;
        info!("{title}: {} probes", rows.len());
        sections.push(MatrixSection { title, rows });
    }

    MatrixReport {
        sections,
        last_update: Local::now(),
    }
}

/// Probes the matrix on every run of the watch loop.
#[derive(Debug, Clone)]
pub struct MatrixRunner {
    prober: Prober,
    base_url: String,
    max_concurrency: usize,
}

impl MatrixRunner {
    pub fn new(prober: Prober, base_url: String, max_concurrency: usize) -> Self {
        Self {
            prober,
            base_url,
            max_concurrency,
        }
    }
}

impl SuiteRunner for MatrixRunner {
    type Report = MatrixReport;

    async fn run(&self) -> Result<MatrixReport, LoadError> {
        Ok(run_matrix(&self.prober, &self.base_url, self.max_concurrency).await)
    }
}
