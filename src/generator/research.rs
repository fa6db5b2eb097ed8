//! Research synthesis tasks.
//!
//! Each instance serves a generated web page over a local HTTP server. The
//! agent reads highlighted facts from the page (or a document linked from it)
//! and records them in an Impress presentation.

use crate::categories::TaskType;
use crate::error::GeneratorError;
use crate::generator::domains::{
    self, PageLayout, ResearchDomain, AREA_CODES, COMPANY_SUFFIXES, EMAIL_DOMAINS, EMAIL_PREFIXES,
    EMPLOYEE_BANDS, EVENT_VENUES, LOCATIONS, RESEARCH_DOMAINS,
};
use crate::generator::format::{currency, label_from_identifier, title_case};
use crate::generator::instance::{Artifact, ArtifactRole, GroundTruth, TaskInstance};
use crate::generator::rng::SeededRng;
use crate::generator::{Result, SelectionHints};
use crate::setup::VmLayout;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use tera::{Context, Tera};

/// Minimum text similarity the presentation checker accepts.
pub const TEXT_THRESHOLD: f64 = 0.8;

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ page.title }}</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            line-height: 1.6;
            color: #333;
            background: linear-gradient(135deg, #f5f7fa 0%, #c3cfe2 100%);
            min-height: 100vh;
            padding: 20px;
        }
        .container { max-width: 1200px; margin: 0 auto; background: white; border-radius: 12px; box-shadow: 0 10px 30px rgba(0,0,0,0.1); overflow: hidden; }
        .header { background: linear-gradient(135deg, {{ page.color }} 0%, {{ page.color }}dd 100%); color: white; padding: 2rem; text-align: center; }
        .header h1 { font-size: 2.5rem; font-weight: 700; margin-bottom: 0.5rem; text-shadow: 0 2px 4px rgba(0,0,0,0.3); }
        .header .subtitle { font-size: 1.1rem; opacity: 0.9; font-weight: 300; }
        .content { padding: 2rem; }
        .card { background: #f8f9fa; border: 1px solid #e9ecef; border-radius: 8px; padding: 1.5rem; margin: 1rem 0; }
        .highlight {
            background: linear-gradient(120deg, {{ page.color }}22 0%, {{ page.color }}44 100%);
            padding: 0.2rem 0.5rem 0.2rem 0.8rem;
            border-radius: 4px;
            font-weight: 600;
            color: {{ page.color }};
            border-left: 3px solid {{ page.color }};
            display: inline-block;
            margin: 0.5rem 0;
        }
        .info-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 1.5rem; margin: 2rem 0; }
        .info-item { background: white; border: 1px solid #e9ecef; border-radius: 8px; padding: 1.5rem; text-align: center; }
        .info-item:hover { border-color: {{ page.color }}; box-shadow: 0 0 0 2px {{ page.color }}22; }
        .info-label { font-size: 0.9rem; color: #6c757d; text-transform: uppercase; letter-spacing: 0.5px; margin-bottom: 0.5rem; }
        .info-value { font-size: 1.5rem; font-weight: 700; color: {{ page.color }}; }
        .footer { background: #f8f9fa; padding: 2rem; text-align: center; border-top: 1px solid #e9ecef; color: #6c757d; }
        .btn { display: inline-block; background: {{ page.color }}; color: white; padding: 0.75rem 1.5rem; text-decoration: none; border-radius: 6px; font-weight: 600; }
        .btn:hover { background: {{ page.color }}dd; box-shadow: 0 4px 12px {{ page.color }}44; }
        .navigation { background: white; padding: 1rem 2rem; border-bottom: 1px solid #e9ecef; }
        .nav-links { display: flex; gap: 2rem; list-style: none; }
        .nav-links a { color: #6c757d; text-decoration: none; font-weight: 500; }
        .nav-links a:hover { color: {{ page.color }}; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{{ page.heading }}</h1>
            <div class="subtitle">{{ page.subtitle }}</div>
        </div>

        <nav class="navigation">
            <ul class="nav-links">
{%- for link in page.nav %}
                <li><a href="#{{ link | lower }}">{{ link }}</a></li>
{%- endfor %}
            </ul>
        </nav>

        <div class="content">
            <div class="card">
                <h2>{{ page.card_title }}</h2>
                <p>{{ page.intro }}</p>

                <div class="info-grid">
{%- for item in page.items %}
                    <div class="info-item">
                        <div class="info-label">{{ item.label }}</div>
                        <div class="{% if item.highlight %}highlight{% else %}info-value{% endif %}">{{ item.value }}</div>
                    </div>
{%- endfor %}
                </div>

                <p>{{ page.outro }}</p>
{%- if page.buttons %}

                <div style="text-align: center; margin-top: 2rem;">
{%- for button in page.buttons %}
                    <a href="{{ button.href }}"{% if button.download %} download{% endif %} class="btn"{% if not loop.first %} style="margin-left: 1rem;"{% endif %}>{{ button.label }}</a>
{%- endfor %}
                </div>
{%- endif %}
{%- if page.resources %}

                <div class="card" style="margin-top: 2rem;">
                    <h3>Additional Resources</h3>
                    <ul style="margin: 1rem 0; padding-left: 2rem;">
{%- for resource in page.resources %}
                        <li>{{ resource }}</li>
{%- endfor %}
                    </ul>
                </div>
{%- endif %}
            </div>
        </div>

        <div class="footer">
            <p>{{ page.footer }}</p>
        </div>
    </div>
</body>
</html>
"##;

#[derive(Debug, Serialize)]
struct InfoItem {
    label: String,
    value: String,
    highlight: bool,
}

impl InfoItem {
    fn plain(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            highlight: false,
        }
    }

    fn target(label: &str, value: impl Into<String>) -> Self {
        Self {
            highlight: true,
            ..Self::plain(label, value)
        }
    }
}

#[derive(Debug, Serialize)]
struct Button {
    href: String,
    label: String,
    download: bool,
}

impl Button {
    fn new(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
            download: false,
        }
    }
}

/// Everything the page template needs.
#[derive(Debug, Serialize)]
struct PageView {
    title: String,
    heading: String,
    subtitle: String,
    color: String,
    nav: [&'static str; 3],
    card_title: &'static str,
    intro: String,
    items: Vec<InfoItem>,
    outro: String,
    buttons: Vec<Button>,
    resources: Vec<&'static str>,
    footer: String,
}

fn render_page(page: &PageView) -> Result<String> {
    let mut context = Context::new();
    context.insert("page", page);
    Ok(Tera::one_off(PAGE_TEMPLATE, &context, false)?)
}

struct Company {
    name: String,
    founded: i64,
    employees: &'static str,
    location: &'static str,
}

impl Company {
    fn website(&self) -> String {
        format!("www.{}.com", self.name.to_lowercase().replace([' ', ','], ""))
    }
}

struct Product {
    name: &'static str,
    price: String,
    description: String,
    features: i64,
}

struct Event {
    name: &'static str,
    date: String,
    time: String,
    venue: &'static str,
}

struct Contact {
    phone: String,
    email: String,
}

/// Event dates count forward from a fixed day so that pages do not depend on
/// the wall clock.
fn event_anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN)
}

// Each entity draws from its own offset of the instance seed, so a page that
// shows a product prices it identically regardless of the page layout.

fn draw_company(rng: &mut SeededRng, domain: &ResearchDomain, seed: u64) -> Result<Company> {
    rng.reseed(seed);
    let mut name = rng.pick(domain.companies, "companies")?.to_string();
    if rng.chance(0.3) {
        name = format!("{} {}", name, rng.pick(COMPANY_SUFFIXES, "company suffixes")?);
    }
    Ok(Company {
        name,
        founded: rng.range(domain.founded_range.0..=domain.founded_range.1),
        employees: *rng.pick(EMPLOYEE_BANDS, "employee bands")?,
        location: *rng.pick(LOCATIONS, "locations")?,
    })
}

fn draw_product(rng: &mut SeededRng, domain: &ResearchDomain, seed: u64) -> Result<Product> {
    rng.reseed(seed.wrapping_add(100));
    let name = *rng.pick(domain.products, "products")?;
    let price = rng.range(domain.price_range.0..=domain.price_range.1);
    Ok(Product {
        name,
        price: currency(price),
        description: format!(
            "Professional {} designed for modern {} needs.",
            name.to_lowercase(),
            domain.name
        ),
        features: rng.range(3..=8),
    })
}

fn draw_event(rng: &mut SeededRng, domain: &ResearchDomain, seed: u64) -> Result<Event> {
    rng.reseed(seed.wrapping_add(200));
    let date = event_anchor() + Duration::days(rng.range(30..=365));
    let name = *rng.pick(domain.events, "events")?;
    Ok(Event {
        name,
        date: date.format("%B %d, %Y").to_string(),
        time: format!("{}:00 AM", rng.range(9..=15)),
        venue: *rng.pick(EVENT_VENUES, "event venues")?,
    })
}

fn draw_contact(rng: &mut SeededRng, seed: u64) -> Result<Contact> {
    rng.reseed(seed.wrapping_add(300));
    let area = rng.pick(AREA_CODES, "area codes")?;
    let phone = format!("({}) {}-{}", area, rng.range(100..=999), rng.range(1000..=9999));
    let prefix = rng.pick(EMAIL_PREFIXES, "email prefixes")?;
    let host = rng.pick(EMAIL_DOMAINS, "email domains")?;
    Ok(Contact {
        phone,
        email: format!("{}@{}", prefix, host),
    })
}

/// A rendered page plus the facts the agent must carry into the presentation.
struct PageContent {
    html: String,
    targets: Vec<String>,
    document: Option<Artifact>,
}

fn build_page(
    rng: &mut SeededRng,
    layout: &VmLayout,
    domain: &ResearchDomain,
    page_layout: PageLayout,
    seed: u64,
) -> Result<PageContent> {
    let area = title_case(domain.name);
    let name = domain.name;
    let mut document = None;

    let (page, targets) = match page_layout {
        PageLayout::CompanyInfo => {
            let company = draw_company(rng, domain, seed)?;
            let target = format!("Founded in {}", company.founded);
            let page = PageView {
                title: format!("{} - Company Information", company.name),
                heading: company.name.clone(),
                subtitle: format!("Leading {} Solutions", area),
                color: rng.pick(domain.colors, "colors")?.to_string(),
                nav: ["About", "Services", "Contact"],
                card_title: "About Our Company",
                intro: format!(
                    "Welcome to {}, your trusted partner in {} solutions. We have built our reputation \
                     on delivering exceptional results and innovative approaches.",
                    company.name, name
                ),
                items: vec![
                    InfoItem::target("Established", target.clone()),
                    InfoItem::plain("Location", company.location),
                    InfoItem::plain("Team Size", format!("{} employees", company.employees)),
                ],
                outro: format!(
                    "Since our founding, we have been committed to excellence and have served thousands \
                     of satisfied customers across the {} industry.",
                    name
                ),
                buttons: Vec::new(),
                resources: Vec::new(),
                footer: format!(
                    "Visit us at {} | © 2024 {}. All rights reserved.",
                    company.website(),
                    company.name
                ),
            };
            (page, vec![target])
        }
        PageLayout::ProductInfo => {
            let product = draw_product(rng, domain, seed)?;
            let target = format!("Price: {}", product.price);
            let page = PageView {
                title: format!("{} - Product Details", product.name),
                heading: product.name.to_string(),
                subtitle: format!("Professional {} Solution", area),
                color: rng.pick(domain.colors, "colors")?.to_string(),
                nav: ["Features", "Pricing", "Support"],
                card_title: "Product Overview",
                intro: product.description.clone(),
                items: vec![
                    InfoItem::plain("Features", format!("{}+ powerful features", product.features)),
                    InfoItem::plain("Category", area.clone()),
                    InfoItem::target("Investment", target.clone()),
                ],
                outro: format!(
                    "Experience the power of modern {} technology with our comprehensive solution. \
                     Designed for professionals who demand excellence and reliability.",
                    name
                ),
                buttons: vec![Button::new("#purchase", "Get Started Today")],
                resources: Vec::new(),
                footer: format!("Professional {} solutions you can trust | 24/7 support available", name),
            };
            (page, vec![target])
        }
        PageLayout::EventInfo => {
            let event = draw_event(rng, domain, seed)?;
            let target = format!("Date: {}", event.date);
            let page = PageView {
                title: format!("{} - Event Information", event.name),
                heading: event.name.to_string(),
                subtitle: format!("Premier {} Industry Event", area),
                color: rng.pick(domain.colors, "colors")?.to_string(),
                nav: ["Agenda", "Speakers", "Register"],
                card_title: "Join Us for an Exceptional Event",
                intro: format!(
                    "Don't miss this opportunity to connect with industry leaders, learn about the latest \
                     trends, and expand your professional network in the {} sector.",
                    name
                ),
                items: vec![
                    InfoItem::target("Event Date", target.clone()),
                    InfoItem::plain("Time", event.time),
                    InfoItem::plain("Venue", event.venue),
                ],
                outro: format!(
                    "This premier {} event brings together professionals, thought leaders, and innovators \
                     to share insights and drive the future of our industry.",
                    name
                ),
                buttons: vec![Button::new("#register", "Register Now")],
                resources: Vec::new(),
                footer: "Secure your spot today - Limited seats available | Early bird pricing ends soon"
                    .to_string(),
            };
            (page, vec![target])
        }
        PageLayout::ProductCatalog => {
            let product = draw_product(rng, domain, seed)?;
            let targets = vec![
                format!("Product: {}", product.name),
                format!("Price: {}", product.price),
            ];
            let page = PageView {
                title: format!("Product Catalog - {} Solutions", area),
                heading: "Featured Products".to_string(),
                subtitle: format!("Professional {} Solutions", area),
                color: rng.pick(domain.colors, "colors")?.to_string(),
                nav: ["Products", "Compare", "Support"],
                card_title: "Premium Product Offering",
                intro: format!(
                    "Discover our flagship {} solution designed for modern businesses and professionals.",
                    name
                ),
                items: vec![
                    InfoItem::target("Featured Solution", targets[0].clone()),
                    InfoItem::target("Investment", targets[1].clone()),
                    InfoItem::plain("Features", format!("{}+ capabilities", product.features)),
                ],
                outro: format!(
                    "{} Our solution combines cutting-edge technology with user-friendly design to deliver \
                     exceptional results for {} professionals.",
                    product.description, name
                ),
                buttons: vec![
                    Button::new("#details", "View Full Details"),
                    Button::new("#purchase", "Purchase Now"),
                ],
                resources: Vec::new(),
                footer: format!(
                    "Browse our complete catalog of {} solutions | 30-day money-back guarantee",
                    name
                ),
            };
            (page, targets)
        }
        PageLayout::ContactInfo => {
            let contact = draw_contact(rng, seed)?;
            let targets = vec![
                format!("Phone: {}", contact.phone),
                format!("Email: {}", contact.email),
            ];
            let page = PageView {
                title: format!("Contact Information - {} Support", area),
                heading: "Get In Touch".to_string(),
                subtitle: format!("Professional {} Support", area),
                color: rng.pick(domain.colors, "colors")?.to_string(),
                nav: ["Contact", "Support", "Hours"],
                card_title: "We're Here to Help",
                intro: format!(
                    "Our expert {} team is ready to assist you with any questions or support needs you may have.",
                    name
                ),
                items: vec![
                    InfoItem::target("Call Us", targets[0].clone()),
                    InfoItem::target("Email Us", targets[1].clone()),
                    InfoItem::plain("Response Time", "Within 24 hours"),
                ],
                outro: format!(
                    "Our dedicated support team has extensive experience in {} solutions and is committed \
                     to providing you with prompt, professional assistance.",
                    name
                ),
                buttons: vec![
                    Button::new(format!("tel:{}", contact.phone), "Call Now"),
                    Button::new(format!("mailto:{}", contact.email), "Send Email"),
                ],
                resources: Vec::new(),
                footer: "Available Monday-Friday 9AM-6PM PST | Emergency support available 24/7".to_string(),
            };
            (page, targets)
        }
        PageLayout::DocumentRepository => {
            rng.reseed(seed);
            let content = *rng.pick(domain.documents, "documents")?;
            let number = rng.range(1000..=9999);
            let short: String = name.replace('_', "").chars().take(4).collect::<String>().to_uppercase();
            let filename = format!("{}_{}_document.txt", short, number);
            let description = format!("{} Document #{}", label_from_identifier(name), number);
            let spaced = name.replace('_', " ");
            let page = PageView {
                title: format!("Document Repository - {} Resources", area),
                heading: "Document Center".to_string(),
                subtitle: format!("Professional {} Resources", area),
                color: rng.pick(domain.colors, "colors")?.to_string(),
                nav: ["Documents", "Resources", "Support"],
                card_title: "Professional Documentation",
                intro: format!(
                    "Access our comprehensive library of {} documentation, guidelines, and professional resources.",
                    spaced
                ),
                items: vec![
                    InfoItem::plain("Available Document", description.clone()),
                    InfoItem::plain("Category", area.clone()),
                    InfoItem::plain("Format", "Text Document"),
                ],
                outro: format!(
                    "This document contains essential information for {} professionals and provides detailed \
                     guidance on current industry practices and standards.",
                    spaced
                ),
                buttons: vec![Button {
                    download: true,
                    ..Button::new(layout.download_url(&filename), format!("Download {}", description))
                }],
                resources: vec![
                    "Professional guidelines and best practices",
                    "Industry standards and compliance information",
                    "Technical documentation and specifications",
                    "Training materials and educational resources",
                ],
                footer: "All documents are provided in accessible formats | Updated regularly with latest industry standards"
                    .to_string(),
            };
            document = Some(Artifact::new(filename, content));
            (page, vec![content.to_string()])
        }
    };

    Ok(PageContent {
        html: render_page(&page)?,
        targets,
        document,
    })
}

/// Checker spec for the saved presentation, shaped by level.
fn presentation_spec(level: u8, targets: &[String]) -> serde_json::Value {
    let options = json!({ "text_threshold": TEXT_THRESHOLD });
    match level {
        1 => json!({
            "global": { "required_texts": targets },
            "options": options,
        }),
        2 => {
            let slides: Vec<_> = targets
                .iter()
                .enumerate()
                .map(|(index, text)| {
                    json!({
                        "match": { "by_index": index },
                        "required": { "texts_all": [text] },
                    })
                })
                .collect();
            json!({ "slides": slides, "options": options })
        }
        _ => json!({
            "slides": [{ "required": { "texts_all": targets } }],
            "options": options,
        }),
    }
}

fn instructions_for(page_layout: PageLayout, presentation_path: &str) -> String {
    let save = format!("Save the completed presentation as '{}'.", presentation_path);
    match page_layout {
        PageLayout::CompanyInfo | PageLayout::ProductInfo | PageLayout::EventInfo => {
            let question = match page_layout {
                PageLayout::CompanyInfo => "What year was the company founded?",
                PageLayout::ProductInfo => "What is the product price?",
                _ => "What is the event date?",
            };
            format!(
                "Create a presentation slide that answers '{}' using information from the provided webpage. {}",
                question, save
            )
        }
        PageLayout::ProductCatalog => format!(
            "Create a two-slide presentation where you identify the product name and price, creating two \
             slides: placing the product name on the first slide and the price on the second slide from \
             the provided webpage. {}",
            save
        ),
        PageLayout::ContactInfo => format!(
            "Create a two-slide presentation where you identify the contact phone number and email address, \
             creating two slides: placing the phone number on the first slide and the email address on the \
             second slide from the provided webpage. {}",
            save
        ),
        PageLayout::DocumentRepository => format!(
            "Create a presentation slide containing the complete content from the text file available on \
             the provided webpage. {}",
            save
        ),
    }
}

/// Builds a web-extraction instance for any research task type.
pub fn web_task(
    rng: &mut SeededRng,
    layout: &VmLayout,
    task_type: TaskType,
    hints: &SelectionHints,
) -> Result<TaskInstance> {
    let level = task_type.level();
    let seed = rng.seed();
    let presentation = format!("presentation_{}.pptx", rng.range(1000..=9999));

    rng.reseed(seed);
    let domain = domains::select(rng, RESEARCH_DOMAINS, hints.domain(), "research domain")?;
    let layouts = PageLayout::for_level(level);
    if layouts.is_empty() {
        return Err(GeneratorError::UnknownContentType {
            task_type: task_type.to_string(),
            content_type: format!("level {}", level),
        });
    }
    let page_layout = *domains::select(rng, layouts.as_slice(), hints.variant(), "page layout")?;

    let content = build_page(rng, layout, domain, page_layout, seed)?;
    if content.targets.is_empty() || content.targets.iter().any(String::is_empty) {
        return Err(GeneratorError::Inconsistent(format!(
            "page layout {} produced no target text",
            page_layout.as_str()
        )));
    }
    // entity helpers reseed; restore the recorded seed
    rng.reseed(seed);

    let page_file = format!("webpage_{}.html", seed);
    let presentation_path = layout.documents_path(&presentation);
    let stem = presentation.trim_end_matches(".pptx");
    let spec = presentation_spec(level, &content.targets);

    let mut artifacts = BTreeMap::new();
    artifacts.insert(ArtifactRole::MainFile, Artifact::new(&page_file, content.html));
    artifacts.insert(
        ArtifactRole::PresentationSpec,
        Artifact::new(
            format!("expected_{}.json", stem),
            serde_json::to_string_pretty(&spec)?,
        ),
    );

    let mut details = BTreeMap::new();
    details.insert("page_layout".to_string(), page_layout.as_str().to_string());
    details.insert("presentation_file".to_string(), presentation.clone());
    details.insert("target_url".to_string(), layout.page_url(&page_file));
    if let Some(document) = content.document {
        details.insert("download_url".to_string(), layout.download_url(&document.filename));
        artifacts.insert(ArtifactRole::DownloadFile, document);
    }

    Ok(TaskInstance {
        task_type,
        level,
        seed,
        domain: domain.name.to_string(),
        template_variant: page_layout.as_str().to_string(),
        artifacts,
        instructions: instructions_for(page_layout, &presentation_path),
        ground_truth: GroundTruth::Presentation {
            path: presentation_path,
            texts: content.targets,
        },
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(task_type: TaskType, seed: u64, hints: &SelectionHints) -> TaskInstance {
        let mut rng = SeededRng::new(seed);
        web_task(&mut rng, &VmLayout::default(), task_type, hints).expect("generate")
    }

    #[test]
    fn test_page_highlights_every_target() {
        for task_type in [
            TaskType::BasicWebExtraction,
            TaskType::MultiPointSummary,
        ] {
            for seed in 0..8 {
                let instance = generate(task_type, seed, &SelectionHints::default());
                let html = &instance.artifact(ArtifactRole::MainFile).unwrap().content;
                let GroundTruth::Presentation { texts, .. } = &instance.ground_truth else {
                    panic!("wrong ground truth");
                };
                for text in texts {
                    assert!(
                        html.contains(&format!("<div class=\"highlight\">{}</div>", text)),
                        "missing highlighted {:?}",
                        text
                    );
                }
            }
        }
    }

    #[test]
    fn test_page_renders_navigation_anchors() {
        let hints = SelectionHints::new().with_variant("company_info");
        let instance = generate(TaskType::BasicWebExtraction, 4, &hints);
        let html = &instance.artifact(ArtifactRole::MainFile).unwrap().content;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r##"<a href="#about">About</a>"##));
        assert!(html.contains(r##"<a href="#contact">Contact</a>"##));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_layout_always_matches_level() {
        for task_type in [
            TaskType::BasicWebExtraction,
            TaskType::MultiPointSummary,
            TaskType::FileDownloadIntegration,
        ] {
            let allowed: Vec<_> = PageLayout::for_level(task_type.level())
                .iter()
                .map(PageLayout::as_str)
                .collect();
            for seed in 0..16 {
                let instance = generate(task_type, seed, &SelectionHints::default());
                assert!(allowed.contains(&instance.template_variant.as_str()));
            }
        }
    }

    #[test]
    fn test_level_two_has_two_targets() {
        let instance = generate(TaskType::MultiPointSummary, 5, &SelectionHints::default());
        let GroundTruth::Presentation { texts, .. } = &instance.ground_truth else {
            panic!("wrong ground truth");
        };
        assert_eq!(texts.len(), 2);
        let spec: serde_json::Value = serde_json::from_str(
            &instance.artifact(ArtifactRole::PresentationSpec).unwrap().content,
        )
        .expect("spec json");
        assert_eq!(spec["slides"][1]["match"]["by_index"], 1);
        assert_eq!(spec["options"]["text_threshold"], 0.8);
    }

    #[test]
    fn test_product_price_uses_currency_format() {
        let hints = SelectionHints::new().with_domain("food_beverage").with_variant("product_info");
        let instance = generate(TaskType::BasicWebExtraction, 17, &hints);
        let GroundTruth::Presentation { texts, .. } = &instance.ground_truth else {
            panic!("wrong ground truth");
        };
        // food_beverage prices stay below 100
        assert!(texts[0].starts_with("Price: $"));
        assert!(texts[0].ends_with(".99"));
        assert_eq!(instance.template_variant, "product_info");
    }

    #[test]
    fn test_layout_hint_from_another_level_is_ignored() {
        let hints = SelectionHints::new().with_variant("contact_info");
        let instance = generate(TaskType::BasicWebExtraction, 3, &hints);
        let level_one: Vec<_> = PageLayout::for_level(1).iter().map(PageLayout::as_str).collect();
        assert!(level_one.contains(&instance.template_variant.as_str()));
    }

    #[test]
    fn test_download_task_links_document() {
        let instance = generate(TaskType::FileDownloadIntegration, 42, &SelectionHints::default());
        let document = instance.artifact(ArtifactRole::DownloadFile).expect("document");
        assert!(document.filename.ends_with("_document.txt"));
        assert_eq!(document.content.lines().count(), 2);

        let html = &instance.artifact(ArtifactRole::MainFile).unwrap().content;
        let url = format!("http://localhost:8080/files/{}", document.filename);
        assert!(html.contains(&url));
        assert_eq!(instance.detail("download_url"), Some(url.as_str()));

        let GroundTruth::Presentation { texts, path } = &instance.ground_truth else {
            panic!("wrong ground truth");
        };
        assert_eq!(texts, &vec![document.content.clone()]);
        assert!(path.starts_with("/home/user/Documents/presentation_"));
    }

    #[test]
    fn test_event_date_is_after_anchor() {
        let mut rng = SeededRng::new(0);
        let event = draw_event(&mut rng, &RESEARCH_DOMAINS[0], 9).expect("event");
        let date = NaiveDate::parse_from_str(&event.date, "%B %d, %Y").expect("date");
        assert!(date >= event_anchor() + Duration::days(30));
        assert!(date <= event_anchor() + Duration::days(365));
    }

    #[test]
    fn test_company_website() {
        let company = Company {
            name: "DevTools Pro LLC".to_string(),
            founded: 2001,
            employees: "25-50",
            location: "Austin, TX",
        };
        assert_eq!(company.website(), "www.devtoolsprollc.com");
    }
}
