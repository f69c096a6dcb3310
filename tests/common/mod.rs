//! Shared fixtures for the integration tests
//!
//! `ScriptedBrowser` stands in for Chromium: it serves canned pages keyed by
//! URL, fails on request, and records what it was asked to do.

#![allow(dead_code)]

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use web_connector::browser::{BrowserError, BrowserHandle, BrowserLauncher, RenderedPage};
use web_connector::{Config, CrawlMode};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default)]
struct Activity {
    launches: usize,
    shutdowns: usize,
    rendered: Vec<String>,
}

#[derive(Debug, Default)]
struct Script {
    pages: HashMap<String, RenderedPage>,
    failing: HashSet<String>,
}

/// In-memory browser with scripted pages
#[derive(Debug, Clone, Default)]
pub struct ScriptedBrowser {
    script: Arc<Mutex<Script>>,
    activity: Arc<Mutex<Activity>>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` with status 200 at `url`
    pub fn page(self, url: &str, html: &str) -> Self {
        self.respond(url, url, 200, html)
    }

    /// Serves `html` with the given status at `url`
    pub fn status(self, url: &str, status: u16, html: &str) -> Self {
        self.respond(url, url, status, html)
    }

    /// Lands on `final_url` when `url` is opened
    pub fn redirect(self, url: &str, final_url: &str, html: &str) -> Self {
        self.respond(url, final_url, 200, html)
    }

    /// Fails navigation to `url`
    pub fn fail(self, url: &str) -> Self {
        self.script.lock().unwrap().failing.insert(url.to_string());
        self
    }

    fn respond(self, url: &str, final_url: &str, status: u16, html: &str) -> Self {
        self.script.lock().unwrap().pages.insert(
            url.to_string(),
            RenderedPage {
                final_url: final_url.to_string(),
                status: Some(status),
                last_modified: None,
                html: html.to_string(),
            },
        );
        self
    }

    pub fn launcher(&self) -> Arc<dyn BrowserLauncher> {
        Arc::new(self.clone())
    }

    pub fn launches(&self) -> usize {
        self.activity.lock().unwrap().launches
    }

    pub fn shutdowns(&self) -> usize {
        self.activity.lock().unwrap().shutdowns
    }

    /// URLs opened, in order
    pub fn rendered(&self) -> Vec<String> {
        self.activity.lock().unwrap().rendered.clone()
    }
}

struct ScriptedHandle {
    browser: ScriptedBrowser,
    stopped: bool,
}

#[async_trait]
impl BrowserLauncher for ScriptedBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>, BrowserError> {
        self.activity.lock().unwrap().launches += 1;
        Ok(Box::new(ScriptedHandle {
            browser: self.clone(),
            stopped: false,
        }))
    }
}

#[async_trait]
impl BrowserHandle for ScriptedHandle {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, BrowserError> {
        self.browser
            .activity
            .lock()
            .unwrap()
            .rendered
            .push(url.to_string());

        let script = self.browser.script.lock().unwrap();
        if script.failing.contains(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }

        script
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })
    }

    async fn shutdown(&mut self) -> Result<(), BrowserError> {
        if !self.stopped {
            self.stopped = true;
            self.browser.activity.lock().unwrap().shutdowns += 1;
        }
        Ok(())
    }
}

/// Config for crawling a local mock server
///
/// SSRF protection is off because the mock server listens on loopback.
pub fn test_config(base_url: &str, mode: CrawlMode, batch_size: usize) -> Config {
    let mut config = Config::new(base_url, mode);
    config.connector.batch_size = batch_size;
    config.security.ssrf_protection = false;
    config.http.probe_timeout_secs = 2;
    config
}

/// Answers every remaining GET with 200 so connectivity probes pass
pub async fn mount_probe_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(server)
        .await;
}

pub fn html_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}

/// A one-page PDF with Title and Author entries
pub fn sample_pdf(title: &str, author: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal("Annual summary")]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Author" => Object::string_literal(author),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
