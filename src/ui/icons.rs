pub struct Icons;

impl Icons {
    pub const CITY: &str = "🏙️";
    pub const ROCKET: &str = "🚀";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const ROBOT: &str = "🤖";
    pub const BULB: &str = "💡";
    pub const WRENCH: &str = "🔧";
    pub const SEARCH: &str = "🔍";
    pub const DATABASE: &str = "🗄️";
    pub const BRAIN: &str = "🧠";
    pub const PERSON: &str = "👤";
    pub const THINKING: &str = "🤔";
    pub const GLOBE: &str = "🌍";
    pub const CLOCK: &str = "⏱️";
    pub const WAVE: &str = "👋";
}
