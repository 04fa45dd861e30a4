use dioxus::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    fn class(self) -> &'static str {
        match self {
            NoticeLevel::Info => "notice notice-info",
            NoticeLevel::Success => "notice notice-success",
            NoticeLevel::Error => "notice notice-error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Notifications {
    pub entries: Vec<Notice>,
    next_id: u64,
}

impl Notifications {
    pub fn push(&mut self, level: NoticeLevel, message: &str) {
        self.next_id += 1;
        self.entries.push(Notice {
            id: self.next_id,
            level,
            message: message.to_string(),
        });
    }

    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|notice| notice.id != id);
    }
}

pub fn use_notifications() -> Signal<Notifications> {
    use_context::<Signal<Notifications>>()
}

pub fn notify(notices: &mut Signal<Notifications>, level: NoticeLevel, message: &str) {
    notices.write().push(level, message);
}

/// Owns the notification list and renders it above `children`.
#[component]
pub fn NotificationProvider(children: Element) -> Element {
    let mut notices = use_signal(Notifications::default);
    use_context_provider(|| notices);

    rsx! {
        {children}
        div {
            class: "notices",
            for notice in notices().entries {
                div {
                    key: "{notice.id}",
                    class: notice.level.class(),
                    span { "{notice.message}" }
                    button {
                        class: "notice-close",
                        onclick: move |_| notices.write().dismiss(notice.id),
                        "×"
                    }
                }
            }
        }
    }
}
