//! Built-in content: first-load defaults and the demo portfolio
//!
//! The defaults are what every slice heals back to when storage is empty or
//! unreadable. The demo set is a fully populated site an admin can load to
//! see every section rendered.

use serde_json::{json, Value};

use crate::content::{
    Alignment, FooterConfig, FooterLink, GlobalConfig, LayoutDefaults, NavConfig, NavLink,
    Section, SectionContent, SectionType, SiteConfig, SocialLink, StatusRow, Theme, WidthMode,
};
use crate::themes;

const BRAND_NAME: &str = "ALEX.MORGAN";
const BRAND_TAGLINE: &str = "DIGITAL_ANALYST.exe";

/// The seven canonical sections, ids equal to their type, empty content
pub fn sections() -> Vec<Section> {
    SectionType::CANONICAL
        .iter()
        .enumerate()
        .map(|(idx, kind)| Section::builtin(*kind, idx as i64))
        .collect()
}

pub fn theme() -> Theme {
    themes::default_theme()
}

pub fn site_config() -> SiteConfig {
    SiteConfig {
        site_name: BRAND_NAME.to_string(),
        tagline: BRAND_TAGLINE.to_string(),
        logo_url: String::new(),
        layout_defaults: LayoutDefaults {
            alignment: Alignment::Center,
            width: WidthMode::Contained,
            full_height: false,
            mobile_center: true,
        },
    }
}

fn nav_link(label: &str, href: &str) -> NavLink {
    NavLink {
        label: label.to_string(),
        href: href.to_string(),
        is_visible: Some(true),
    }
}

pub fn navigation_config() -> NavConfig {
    NavConfig {
        items: vec![
            nav_link("HOME", "#hero"),
            nav_link("PROFILE", "#about"),
            nav_link("MODULES", "#skills"),
            nav_link("ARCHIVES", "#projects"),
            nav_link("LOG", "#experience"),
            nav_link("DATA", "#testimonials"),
            nav_link("CONNECT", "#contact"),
        ],
        cta_label: "INITIATE".to_string(),
        admin_label: "ADMIN".to_string(),
    }
}

fn footer_link(label: &str, href: &str) -> FooterLink {
    FooterLink {
        label: label.to_string(),
        href: href.to_string(),
    }
}

fn social_link(label: &str, href: &str) -> SocialLink {
    SocialLink {
        label: label.to_string(),
        href: href.to_string(),
        icon: None,
    }
}

fn status_row(label: &str, value: &str) -> StatusRow {
    StatusRow {
        label: label.to_string(),
        value: value.to_string(),
    }
}

pub fn footer_config() -> FooterConfig {
    FooterConfig {
        brand_name: BRAND_NAME.to_string(),
        tagline: BRAND_TAGLINE.to_string(),
        about_text: "Transforming raw data into intelligent decisions. Specializing in AI-driven analytics and digital transformation.".to_string(),
        copyright_prefix: "©".to_string(),
        built_with_text: "BUILT_WITH REACT + TAILWIND".to_string(),
        nav_links: vec![
            footer_link("HOME", "#hero"),
            footer_link("PROFILE", "#about"),
            footer_link("MODULES", "#skills"),
            footer_link("ARCHIVES", "#projects"),
        ],
        system_links: vec![
            footer_link("DATA_ANALYTICS", "#skills"),
            footer_link("CLOUD_ARCH", "#skills"),
            footer_link("AI_ML", "#skills"),
            footer_link("SECURITY", "#skills"),
        ],
        social_links: vec![
            social_link("GitHub", "#"),
            social_link("LinkedIn", "#"),
            social_link("Twitter", "#"),
            social_link("Discord", "#"),
        ],
        status_rows: vec![
            status_row("UPTIME", "99.99%"),
            status_row("LATENCY", "12ms"),
            status_row("ENCRYPTION", "AES-256"),
            status_row("VERSION", "v2.0.26"),
        ],
    }
}

pub fn global_config() -> GlobalConfig {
    GlobalConfig {
        site: site_config(),
        navigation: navigation_config(),
        footer: footer_config(),
    }
}

// ==============================================================================
// Demo portfolio
// ==============================================================================

fn demo_section(kind: SectionType, order: i64, content: Value) -> Section {
    let mut section = Section::builtin(kind, order);
    section.content = SectionContent::from_value(kind, content);
    section
}

/// Fully populated sections for the "load demo content" action
pub fn demo_sections() -> Vec<Section> {
    vec![
        demo_section(SectionType::Hero, 0, json!({
            "name": "Alex Morgan",
            "title": "Digital Technology Analyst",
            "description": "Transforming complex data into actionable intelligence. Specializing in AI-driven analytics, cloud architecture, and digital innovation.",
            "ctaPrimary": "Explore My Work",
            "ctaSecondary": "Get In Touch",
            "imageUrl": "",
            "sectionHeading": ""
        })),
        demo_section(SectionType::About, 1, json!({
            "bio": "I'm a passionate digital analyst with a track record of delivering data-driven solutions. With expertise in cloud technologies and AI/ML applications, I help organizations optimize their operations and unlock new opportunities.",
            "stats": [
                { "label": "Years Experience", "value": "5+" },
                { "label": "Projects Completed", "value": "50+" },
                { "label": "Happy Clients", "value": "30+" },
                { "label": "Awards Won", "value": "8" }
            ],
            "profileImage": "",
            "sectionHeading": "ABOUT_ME"
        })),
        demo_section(SectionType::Skills, 2, json!({
            "items": [
                { "id": "skill-1", "name": "Data Analytics", "level": 95, "icon": "📊", "category": "Analytics" },
                { "id": "skill-2", "name": "Python", "level": 90, "icon": "🐍", "category": "Development" },
                { "id": "skill-3", "name": "SQL", "level": 92, "icon": "🗄️", "category": "Database" },
                { "id": "skill-4", "name": "AWS", "level": 88, "icon": "☁️", "category": "Cloud" },
                { "id": "skill-5", "name": "Machine Learning", "level": 85, "icon": "🤖", "category": "AI/ML" },
                { "id": "skill-6", "name": "Tableau", "level": 89, "icon": "📈", "category": "Analytics" }
            ],
            "categories": [
                { "name": "Analytics", "skills": ["Data Analytics", "Tableau", "Statistics"] },
                { "name": "Development", "skills": ["Python", "JavaScript", "TypeScript"] },
                { "name": "Cloud", "skills": ["AWS", "Azure", "GCP"] },
                { "name": "Database", "skills": ["SQL", "NoSQL", "MongoDB"] },
                { "name": "AI/ML", "skills": ["Machine Learning", "Deep Learning", "NLP"] }
            ],
            "sectionHeading": "TECHNICAL_SKILLS"
        })),
        demo_section(SectionType::Projects, 3, json!({
            "items": [
                {
                    "id": "proj-1",
                    "title": "AI Analytics Platform",
                    "shortDesc": "Enterprise analytics platform powered by machine learning",
                    "description": "Built a comprehensive analytics platform that leverages machine learning to predict trends and provide actionable insights. Reduced analysis time by 60%.",
                    "image": "",
                    "tech": ["Python", "TensorFlow", "AWS", "React"],
                    "impact": "60% efficiency increase",
                    "status": "Completed"
                },
                {
                    "id": "proj-2",
                    "title": "Cloud Migration Project",
                    "shortDesc": "Migrated legacy systems to cloud infrastructure",
                    "description": "Orchestrated migration of 50+ microservices to cloud. Achieved 40% cost reduction and improved system reliability.",
                    "image": "",
                    "tech": ["AWS", "Docker", "Kubernetes", "SQL"],
                    "impact": "40% cost reduction",
                    "status": "Completed"
                },
                {
                    "id": "proj-3",
                    "title": "Real-time Data Dashboard",
                    "shortDesc": "Interactive dashboard for real-time business metrics",
                    "description": "Developed real-time dashboard with WebSocket integration. Processes 1M+ data points per second.",
                    "image": "",
                    "tech": ["React", "Node.js", "WebSocket", "PostgreSQL"],
                    "impact": "1M+ data points/sec",
                    "status": "Completed"
                }
            ],
            "sectionHeading": "FEATURED_PROJECTS"
        })),
        demo_section(SectionType::Experience, 4, json!({
            "items": [
                {
                    "id": "exp-1",
                    "title": "Senior Data Analyst",
                    "company": "Tech Innovations Inc",
                    "location": "San Francisco, CA",
                    "period": "2022 - Present",
                    "type": "FULL_TIME",
                    "description": "Lead data analytics initiatives for enterprise clients. Manage team of 3 junior analysts.",
                    "achievements": ["Delivered 15+ analytics solutions", "Improved model accuracy by 35%", "Mentored junior team members"],
                    "tech": ["Python", "SQL", "Tableau", "AWS"]
                },
                {
                    "id": "exp-2",
                    "title": "Data Analyst",
                    "company": "Digital Solutions Ltd",
                    "location": "New York, NY",
                    "period": "2020 - 2022",
                    "type": "FULL_TIME",
                    "description": "Performed data analysis and created reports for stakeholders.",
                    "achievements": ["Automated 10+ manual processes", "Created 50+ dashboards", "Increased data literacy in organization"],
                    "tech": ["Python", "MySQL", "Excel", "Power BI"]
                },
                {
                    "id": "exp-3",
                    "title": "Junior Analyst",
                    "company": "Analytics First",
                    "location": "Boston, MA",
                    "period": "2019 - 2020",
                    "type": "FULL_TIME",
                    "description": "Started career in data analytics, supporting senior analysts.",
                    "achievements": ["Completed 20+ analysis projects", "Earned Python certification", "Built first ML model"],
                    "tech": ["Excel", "SQL", "Python", "Tableau"]
                }
            ],
            "sectionHeading": "WORK_EXPERIENCE"
        })),
        demo_section(SectionType::Testimonials, 5, json!({
            "items": [
                {
                    "id": "test-1",
                    "quote": "Alex's analytical expertise transformed our business decisions. The insights provided were invaluable.",
                    "author": "Sarah Johnson",
                    "role": "CEO",
                    "company": "Tech Innovations Inc"
                },
                {
                    "id": "test-2",
                    "quote": "Professional, thorough, and delivers results. Highly recommend for any data analytics project.",
                    "author": "Michael Chen",
                    "role": "CTO",
                    "company": "Digital Solutions Ltd"
                },
                {
                    "id": "test-3",
                    "quote": "Exceptional problem-solving skills and attention to detail. A true asset to any team.",
                    "author": "Emma Wilson",
                    "role": "Project Manager",
                    "company": "Analytics First"
                }
            ],
            "sectionHeading": "CLIENT_TESTIMONIALS"
        })),
        demo_section(SectionType::Contact, 6, json!({
            "email": "alex.morgan@example.com",
            "phone": "+1 (555) 123-4567",
            "location": "San Francisco, CA",
            "sectionHeading": "GET_IN_TOUCH"
        })),
    ]
}

/// Demo global record: defaults with real social profile links
pub fn demo_global() -> GlobalConfig {
    let mut global = global_config();
    global.footer.social_links = vec![
        social_link("GitHub", "https://github.com"),
        social_link("LinkedIn", "https://linkedin.com"),
        social_link("Twitter", "https://twitter.com"),
        social_link("Discord", "https://discord.com"),
    ];
    global
}
