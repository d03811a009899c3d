//! Static site content indexed by the sitemap: blog post metadata and
//! professional affiliations.

/// Blog post metadata. Article bodies are rendered by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlogPost {
    pub slug: &'static str,
    pub title: &'static str,
    /// Publication date, `YYYY-MM-DD`.
    pub date: &'static str,
    pub category: &'static str,
    pub tags: &'static [&'static str],
    pub featured: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affiliation {
    pub name: &'static str,
    pub category: &'static str,
    pub url: &'static str,
    pub featured: bool,
}

const BLOG_POSTS: &[BlogPost] = &[
    BlogPost {
        slug: "founders-guide-strategic-exits",
        title: "The Founder's Guide to Strategic Exits",
        date: "2023-05-15",
        category: "Exit Strategy",
        tags: &["M&A", "Valuation", "Exit Planning"],
        featured: true,
    },
    BlogPost {
        slug: "value-drivers-building-products",
        title: "5 Value Drivers for Building Products Companies",
        date: "2023-04-03",
        category: "Business Strategy",
        tags: &["Valuation", "Growth", "Operations"],
        featured: false,
    },
    BlogPost {
        slug: "private-equity-vs-strategic-buyers",
        title: "Private Equity vs. Strategic Buyers: Pros and Cons",
        date: "2023-03-12",
        category: "M&A Process",
        tags: &["Private Equity", "Strategic Buyers", "Deal Structure"],
        featured: false,
    },
    BlogPost {
        slug: "preparing-business-due-diligence",
        title: "Preparing Your Business for Due Diligence",
        date: "2023-02-28",
        category: "M&A Process",
        tags: &["Due Diligence", "Exit Planning", "Preparation"],
        featured: false,
    },
];

const AFFILIATIONS: &[Affiliation] = &[
    Affiliation {
        name: "National Association of Home Builders",
        category: "Industry Associations",
        url: "https://www.nahb.org",
        featured: true,
    },
    Affiliation {
        name: "American Institute of Architects",
        category: "Industry Associations",
        url: "https://www.aia.org",
        featured: true,
    },
    Affiliation {
        name: "Construction Financial Management Association",
        category: "Industry Associations",
        url: "https://www.cfma.org",
        featured: false,
    },
    Affiliation {
        name: "U.S. Green Building Council",
        category: "Industry Associations",
        url: "https://www.usgbc.org",
        featured: true,
    },
    Affiliation {
        name: "Association of Corporate Growth",
        category: "Financial Organizations",
        url: "https://www.acg.org",
        featured: true,
    },
    Affiliation {
        name: "Alliance of M&A Advisors",
        category: "Financial Organizations",
        url: "https://www.amaaonline.com",
        featured: false,
    },
    Affiliation {
        name: "Harvard Business School Alumni Association",
        category: "Educational Institutions",
        url: "https://www.alumni.hbs.edu",
        featured: false,
    },
    Affiliation {
        name: "Wharton Private Equity & Venture Capital Association",
        category: "Educational Institutions",
        url: "https://www.whartonpevca.com",
        featured: false,
    },
    Affiliation {
        name: "Goldman Sachs 10,000 Small Businesses",
        category: "Business Development",
        url: "https://www.goldmansachs.com/citizenship/10000-small-businesses/",
        featured: true,
    },
    Affiliation {
        name: "Vistage International",
        category: "Business Development",
        url: "https://www.vistage.com",
        featured: false,
    },
    Affiliation {
        name: "Entrepreneurs' Organization",
        category: "Business Development",
        url: "https://www.eonetwork.org",
        featured: false,
    },
    Affiliation {
        name: "National Association of Manufacturers",
        category: "Industry Associations",
        url: "https://www.nam.org",
        featured: true,
    },
];

pub fn blog_posts() -> &'static [BlogPost] {
    BLOG_POSTS
}

pub fn affiliations() -> &'static [Affiliation] {
    AFFILIATIONS
}

/// Distinct blog categories in first-seen order.
pub fn blog_categories() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for post in BLOG_POSTS {
        if !out.contains(&post.category) {
            out.push(post.category);
        }
    }
    out
}

/// Distinct blog tags in first-seen order.
pub fn blog_tags() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for tag in BLOG_POSTS.iter().flat_map(|p| p.tags.iter()) {
        if !out.contains(tag) {
            out.push(tag);
        }
    }
    out
}
