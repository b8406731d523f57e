//! Message catalog and the per-request locale.
//!
//! The locale is resolved by the i18n middleware and kept in a task-local for
//! the lifetime of the request, so error rendering can translate without
//! threading the locale through every layer.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Vi,
}

impl Locale {
    /// Parse a language tag such as `vi`, `vi-VN` or `en_US`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "en" => Some(Locale::En),
            "vi" => Some(Locale::Vi),
            _ => None,
        }
    }

    /// Pick the first supported language of an `Accept-Language` header,
    /// honoring quality weights.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut candidates: Vec<(f32, &str)> = header
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.trim().split(';');
                let tag = pieces.next()?.trim();
                if tag.is_empty() {
                    return None;
                }
                let quality = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((quality, tag))
            })
            .collect();

        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        candidates.into_iter().find_map(|(_, tag)| Self::from_tag(tag))
    }
}

tokio::task_local! {
    pub static CURRENT_LOCALE: Locale;
}

/// Locale of the request being served, `En` outside of a request scope.
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.try_with(|l| *l).unwrap_or_default()
}

const VI: &[(&str, &str)] = &[
    ("Invalid credentials", "Email hoặc mật khẩu không chính xác"),
    ("Email already exists", "Email đã tồn tại"),
    ("User not found", "Người dùng không tồn tại"),
    ("Missing Authorization header", "Thiếu header Authorization"),
    (
        "Invalid Authorization header format",
        "Header Authorization không đúng định dạng",
    ),
    ("Invalid or expired token", "Token không hợp lệ hoặc đã hết hạn"),
    ("Missing refresh token", "Thiếu refresh token"),
    ("Invalid refresh token", "Refresh token không hợp lệ"),
    (
        "Refresh token expired and was removed",
        "Refresh token đã hết hạn và bị xóa",
    ),
    (
        "Refresh token is invalid or expired",
        "Refresh token không hợp lệ hoặc đã hết hạn",
    ),
    ("Missing kid in token header", "Kid không tồn tại trong token header"),
    ("Passwords do not match", "Mật khẩu xác nhận không khớp"),
    ("Insufficient permissions", "Không đủ quyền truy cập"),
    (
        "Missing required relations for the specified search fields in relations.",
        "Thiếu quan hệ bắt buộc cho các trường tìm kiếm trong quan hệ.",
    ),
    ("OAuth provider is not configured", "Nhà cung cấp OAuth chưa được cấu hình"),
    (
        "OAuth provider did not return an email",
        "Nhà cung cấp OAuth không trả về email",
    ),
    (
        "OAuth provider email is not verified",
        "Email từ nhà cung cấp OAuth chưa được xác minh",
    ),
    ("Invalid OAuth state", "Tham số state OAuth không hợp lệ"),
    ("Resource not found", "Không tìm thấy tài nguyên"),
    ("Internal server error", "Lỗi máy chủ nội bộ"),
    ("Database error", "Lỗi cơ sở dữ liệu"),
];

/// Translate a message into the given locale, falling back to the input.
pub fn translate(locale: Locale, message: &str) -> Cow<'_, str> {
    let catalog = match locale {
        Locale::En => return Cow::Borrowed(message),
        Locale::Vi => VI,
    };

    catalog
        .iter()
        .find(|(key, _)| *key == message)
        .map(|(_, translated)| Cow::Borrowed(*translated))
        .unwrap_or(Cow::Borrowed(message))
}

pub fn translate_current(message: &str) -> Cow<'_, str> {
    translate(current_locale(), message)
}
