//! Server-rendered HTML: the Treeminder dashboard fragments and the map page.
//!
//! Templates are embedded at build time and registered under their file
//! stem, so any template can be pulled into another as a partial
//! (`{{> header}}`).

use std::sync::Arc;

use handlebars::{handlebars_helper, Handlebars, TemplateError};
use include_dir::{include_dir, Dir};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppResult;

static TEMPLATE_DIR: Dir = include_dir!("templates");

pub const APP_NAME: &str = "Treeminder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardPage {
    Index,
    Header,
    Stats,
    TreeStatus,
    Alerts,
    ViewAlert,
    Navigation,
    MapView,
    Inventory,
    Document,
}

impl DashboardPage {
    pub const ALL: [DashboardPage; 10] = [
        DashboardPage::Index,
        DashboardPage::Header,
        DashboardPage::Stats,
        DashboardPage::TreeStatus,
        DashboardPage::Alerts,
        DashboardPage::ViewAlert,
        DashboardPage::Navigation,
        DashboardPage::MapView,
        DashboardPage::Inventory,
        DashboardPage::Document,
    ];

    pub fn route(&self) -> &'static str {
        match self {
            DashboardPage::Index => "/treeminder/",
            DashboardPage::Header => "/treeminder/header/",
            DashboardPage::Stats => "/treeminder/stats/",
            DashboardPage::TreeStatus => "/treeminder/tree-status/",
            DashboardPage::Alerts => "/treeminder/alerts/",
            DashboardPage::ViewAlert => "/treeminder/viewAlert/",
            DashboardPage::Navigation => "/treeminder/nav/",
            DashboardPage::MapView => "/treeminder/mapView/",
            DashboardPage::Inventory => "/treeminder/inventory/",
            DashboardPage::Document => "/treeminder/document/",
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            DashboardPage::Index => "index",
            DashboardPage::Header => "dashboard_header",
            DashboardPage::Stats => "stats_cards",
            DashboardPage::TreeStatus => "tree_status",
            DashboardPage::Alerts => "recent_alerts",
            DashboardPage::ViewAlert => "view_alert",
            DashboardPage::Navigation => "navigation",
            DashboardPage::MapView => "map_view",
            DashboardPage::Inventory => "inventory",
            DashboardPage::Document => "document",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DashboardPage::Index => "Dashboard",
            DashboardPage::Header => "Header",
            DashboardPage::Stats => "Statistics",
            DashboardPage::TreeStatus => "Tree Status",
            DashboardPage::Alerts => "Recent Alerts",
            DashboardPage::ViewAlert => "Alert",
            DashboardPage::Navigation => "Navigation",
            DashboardPage::MapView => "Map",
            DashboardPage::Inventory => "Inventory",
            DashboardPage::Document => "Documents",
        }
    }
}

/// Entries shown in the navigation bar, in display order.
const NAV_PAGES: [DashboardPage; 5] = [
    DashboardPage::Index,
    DashboardPage::MapView,
    DashboardPage::Inventory,
    DashboardPage::Alerts,
    DashboardPage::Document,
];

#[derive(Debug, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct PageContext {
    pub app_name: &'static str,
    pub version: &'static str,
    pub title: &'static str,
    pub nav: Vec<NavItem>,
}

impl PageContext {
    pub fn new(page: DashboardPage) -> Self {
        Self {
            app_name: APP_NAME,
            version: env!("CARGO_PKG_VERSION"),
            title: page.title(),
            nav: NAV_PAGES
                .iter()
                .map(|nav| NavItem {
                    label: nav.title(),
                    href: nav.route(),
                    active: *nav == page,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MapPageContext {
    app_name: &'static str,
    version: &'static str,
    tree_url: &'static str,
}

pub fn get_handlebars() -> Result<Handlebars<'static>, TemplateError> {
    let mut handlebars = Handlebars::new();

    handlebars_helper!(active_class: |active: bool| if active { "active" } else { "" });
    handlebars.register_helper("active_class", Box::new(active_class));

    register_dir(&mut handlebars, &TEMPLATE_DIR)?;
    Ok(handlebars)
}

fn register_dir(handlebars: &mut Handlebars<'static>, dir: &Dir) -> Result<(), TemplateError> {
    for file in dir.files() {
        let path = file.path();
        if path.extension().and_then(|e| e.to_str()) != Some("hbs") {
            continue;
        }
        let (Some(name), Some(source)) = (path.file_stem().and_then(|s| s.to_str()), file.contents_utf8())
        else {
            continue;
        };
        debug!("Registering template {}", name);
        handlebars.register_template_string(name, source)?;
    }

    for sub_dir in dir.dirs() {
        register_dir(handlebars, sub_dir)?;
    }
    Ok(())
}

/// Shared, read-only template registry.
#[derive(Clone)]
pub struct Views {
    registry: Arc<Handlebars<'static>>,
}

impl Views {
    pub fn load() -> Result<Self, TemplateError> {
        Ok(Self {
            registry: Arc::new(get_handlebars()?),
        })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    pub fn dashboard(&self, page: DashboardPage) -> AppResult<String> {
        Ok(self.registry.render(page.template(), &PageContext::new(page))?)
    }

    pub fn map_page(&self) -> AppResult<String> {
        let context = MapPageContext {
            app_name: APP_NAME,
            version: env!("CARGO_PKG_VERSION"),
            tree_url: "/map/api/tree/",
        };
        Ok(self.registry.render("interactive_map", &context)?)
    }
}
