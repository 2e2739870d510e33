//! The closed set of dashboard pages.

/// A dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Overview metrics and headline charts.
    Dashboard,
    /// Producer directory.
    Producers,
    /// Product catalogue.
    Products,
    /// Sales and customer trends.
    MarketAnalysis,
    /// Certifications and carbon footprint.
    Sustainability,
    /// Events and favourites.
    Community,
}

impl Page {
    /// Every page in navigation order.
    pub const ALL: [Self; 6] = [
        Self::Dashboard,
        Self::Producers,
        Self::Products,
        Self::MarketAnalysis,
        Self::Sustainability,
        Self::Community,
    ];

    /// URL segment under `/pages/`.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Producers => "producers",
            Self::Products => "products",
            Self::MarketAnalysis => "market-analysis",
            Self::Sustainability => "sustainability",
            Self::Community => "community",
        }
    }

    /// Navigation label and heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Producers => "Producers",
            Self::Products => "Products",
            Self::MarketAnalysis => "Market Analysis",
            Self::Sustainability => "Sustainability",
            Self::Community => "Community",
        }
    }

    /// Looks a page up by its slug.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::Page;
    ///
    /// assert_eq!(Page::from_slug("market-analysis"), Some(Page::MarketAnalysis));
    /// assert_eq!(Page::from_slug("weather"), None);
    /// ```
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.slug() == slug)
    }

    /// Resolves a local path produced by [`Page::path`], or `/`.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        if path == "/" {
            return Some(Self::Dashboard);
        }
        path.strip_prefix("/pages/").and_then(Self::from_slug)
    }

    /// Canonical path of the page.
    #[must_use]
    pub fn path(self) -> String {
        format!("/pages/{}", self.slug())
    }

    /// Whether the sidebar shows the filter form.
    #[must_use]
    pub const fn shows_filters(self) -> bool {
        matches!(self, Self::Producers | Self::Products | Self::MarketAnalysis)
    }

    /// Whether the filter form includes the in-season control.
    #[must_use]
    pub const fn shows_season_filter(self) -> bool {
        matches!(self, Self::Products | Self::MarketAnalysis)
    }
}
