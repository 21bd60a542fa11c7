//! services/bot/src/chat/messages.rs
//!
//! User-facing strings and button labels. The bot speaks English for the
//! login flow and Arabic for the browsing flow, matching the portal's
//! audience.

pub const ROLE_PROMPT: &str = "Welcome! Please select your role:";
pub const CREDENTIALS_PROMPT: &str =
    "Please enter your email and password in the format:\nemail:password";

pub const GENERIC_ERROR: &str = "An error occurred. Please try again.";
pub const LOGIN_INIT_FAILED: &str = "Failed to initialize login. Please try again.";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials. Please try again.";
pub const NOT_LOGGED_IN: &str = "Please send /start and log in first.";
pub const LOGGED_OUT: &str = "You have been logged out.";
pub const MAIN_MENU: &str = "Main menu:";

pub const CHOOSE_YEAR_BOOKS: &str = "اختر الفرقة الدراسية للكتب:";
pub const CHOOSE_YEAR_SUMMARIES: &str = "اختر الفرقة الدراسية للملخصات:";
pub const CHOOSE_YEAR_PLAYLISTS: &str = "اختر الفرقة الدراسية للفيديوهات:";

pub const CHOOSE_FILE: &str = "اختر الملف الذي تريد تحميله:";
pub const NO_FILES: &str = "لا توجد ملفات متاحة لهذه الفرقة حالياً.";
pub const YEAR_UNAVAILABLE: &str = "عذراً، محتوى هذه الفرقة غير متوفر حالياً.";
pub const FILE_UNAVAILABLE: &str = "عذراً، الملف غير متوفر حالياً.";
pub const DELIVERY_FAILED: &str = "حدث خطأ أثناء إرسال الملف. يرجى المحاولة مرة أخرى.";
pub const REQUEST_EXPIRED: &str = "عذراً، انتهت صلاحية الطلب. يرجى المحاولة مرة أخرى.";
pub const NO_PLAYLISTS: &str = "لا توجد قوائم تشغيل متاحة لهذه الفرقة حالياً.";

pub const BTN_STUDENT: &str = "Student";
pub const BTN_BOOKS: &str = "Download Books";
pub const BTN_SUMMARIES: &str = "Download Summaries";
pub const BTN_PLAYLISTS: &str = "Study Playlists";
pub const BTN_LOGOUT: &str = "Logout";
pub const BTN_BACK: &str = "رجوع";

pub fn welcome(name: &str, email: &str, study_group: &str) -> String {
    format!("Welcome {name}\nYour email: {email}\nStudy group: {study_group}")
}
