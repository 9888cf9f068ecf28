use super::{failed, Source};
use crate::net::ReqwestHttpClient;
use posture_config::SourcesConfig;
use posture_core::{AdapterResult, HomePage, Target};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

const NAME: &str = "home";
const ERROR_PREFIX: &str = "page inspection failed";
const MAX_SCRIPTS: usize = 50;

/// Script-src substrings and the library each one indicates.
const LIBRARY_KEYWORDS: &[(&str, &str)] = &[
    ("jquery", "jquery"),
    ("react", "react"),
    ("react-dom", "react"),
    ("angular", "angular"),
    ("vue", "vue"),
    ("wp-content", "wordpress"),
    ("wp-includes", "wordpress"),
];

/// Home page fetch and lightweight fingerprint.
#[derive(Clone, Debug)]
pub struct PageSource {
    http: ReqwestHttpClient,
    timeout: Duration,
    max_bytes: u64,
}

impl PageSource {
    pub fn new(http: ReqwestHttpClient, config: &SourcesConfig) -> Self {
        Self {
            http,
            timeout: config.page_timeout(),
            max_bytes: config.page_max_bytes,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Fingerprint {
    pub generator: Option<String>,
    pub detected_libs: Vec<String>,
}

/// Generator meta tag and script libraries from an HTML document.
pub fn fingerprint(html: &str) -> Fingerprint {
    let document = Html::parse_document(html);
    let mut fp = Fingerprint::default();

    if let Ok(generator_selector) = Selector::parse(r#"meta[name="generator"]"#) {
        fp.generator = document
            .select(&generator_selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .filter(|c| !c.is_empty())
            .map(str::to_string);
    }

    if let Ok(script_selector) = Selector::parse("script[src]") {
        let srcs = document
            .select(&script_selector)
            .filter_map(|el| el.value().attr("src"))
            .take(MAX_SCRIPTS);
        for src in srcs {
            for (keyword, lib) in LIBRARY_KEYWORDS {
                if src.contains(keyword) && !fp.detected_libs.iter().any(|l| l == lib) {
                    fp.detected_libs.push(lib.to_string());
                }
            }
        }
    }
    fp
}

#[async_trait::async_trait]
impl Source for PageSource {
    type Output = HomePage;

    fn name(&self) -> &'static str {
        NAME
    }

    async fn fetch(&self, target: &Target) -> AdapterResult<HomePage> {
        let resp = match self
            .http
            .get_capped(&target.url, self.timeout, self.max_bytes)
            .await
        {
            Ok(resp) => resp,
            Err(e) => return failed(NAME, ERROR_PREFIX, e),
        };

        let is_html = resp
            .header("content-type")
            .is_some_and(|ct| ct.contains("text/html"));
        let mut page = HomePage {
            status: resp.status,
            headers: resp.headers.clone(),
            generator: None,
            detected_libs: None,
        };
        if is_html {
            let fp = fingerprint(&String::from_utf8_lossy(&resp.body));
            page.generator = fp.generator;
            page.detected_libs = Some(fp.detected_libs);
        }

        debug!(
            source = NAME,
            status = page.status,
            bytes = resp.body.len(),
            html = is_html,
            "page fetched"
        );
        AdapterResult::Ok(page)
    }
}
