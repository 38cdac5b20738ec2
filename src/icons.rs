/// Icons the dashboard can draw. Pages render them as an emoji glyph inside a
/// span carrying the icon's CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Leaf,
    CheckCircle,
    Factory,
    Package,
    Truck,
    ShoppingBag,
    Store,
    GitBranch,
    ArrowRight,
    AlertTriangle,
    Shield,
    User,
    Calendar,
}

impl Icon {
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Leaf => "🌱",
            Icon::CheckCircle => "✅",
            Icon::Factory => "🏭",
            Icon::Package => "📦",
            Icon::Truck => "🚚",
            Icon::ShoppingBag => "🛍️",
            Icon::Store => "🏪",
            Icon::GitBranch => "🔀",
            Icon::ArrowRight => "➡️",
            Icon::AlertTriangle => "⚠️",
            Icon::Shield => "🛡️",
            Icon::User => "👤",
            Icon::Calendar => "📅",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Icon::Leaf => "icon-leaf",
            Icon::CheckCircle => "icon-check",
            Icon::Factory => "icon-factory",
            Icon::Package => "icon-package",
            Icon::Truck => "icon-truck",
            Icon::ShoppingBag => "icon-bag",
            Icon::Store => "icon-store",
            Icon::GitBranch => "icon-branch",
            Icon::ArrowRight => "icon-arrow",
            Icon::AlertTriangle => "icon-alert",
            Icon::Shield => "icon-shield",
            Icon::User => "icon-user",
            Icon::Calendar => "icon-calendar",
        }
    }
}
