//! Admin view of every account: search, change roles, remove.

use api::{Role, UserRecord};
use dioxus::prelude::*;
use ui::{notify, use_app, use_notifications, use_session, Loader, NoticeLevel};

/// Row data with everything the table needs precomputed.
#[derive(Debug, Clone, PartialEq)]
struct UserRow {
    record: UserRecord,
    name: String,
    role: Role,
    is_self: bool,
}

fn user_rows(records: &[UserRecord], own_email: Option<&str>) -> Vec<UserRow> {
    records
        .iter()
        .map(|record| UserRow {
            name: record.display_name().to_string(),
            role: record.role(),
            is_self: own_email.is_some_and(|own| own.eq_ignore_ascii_case(&record.email)),
            record: record.clone(),
        })
        .collect()
}

#[component]
pub fn ManageUsers() -> Element {
    let app = use_app();
    let session = use_session();
    let mut notices = use_notifications();
    let mut search = use_signal(String::new);

    let directory = app.users.clone();
    let mut users = use_resource(move || {
        let directory = directory.clone();
        let search = search();
        async move { directory.list(search.trim()).await }
    });

    let own_email = session().principal.and_then(|p| p.email);

    let change_role = {
        let app = app.clone();
        move |(record, value): (UserRecord, String)| {
            let app = app.clone();
            spawn(async move {
                let Ok(role) = value.parse::<Role>() else {
                    return;
                };
                match app.users.set_role(&record, role).await {
                    Ok(result) if result.changed() => {
                        let message = format!("{} is now {}", record.display_name(), role);
                        notify(&mut notices, NoticeLevel::Success, &message);
                        users.restart();
                    }
                    Ok(_) => notify(&mut notices, NoticeLevel::Info, "Role unchanged"),
                    Err(err) => notify(&mut notices, NoticeLevel::Error, &err.to_string()),
                }
            });
        }
    };

    let remove_user = move |record: UserRecord| {
        let app = app.clone();
        spawn(async move {
            match app.users.remove(&record).await {
                Ok(()) => {
                    let message = format!("Removed {}", record.display_name());
                    notify(&mut notices, NoticeLevel::Success, &message);
                    users.restart();
                }
                Err(err) => notify(&mut notices, NoticeLevel::Error, &err.to_string()),
            }
        });
    };

    let content = match &*users.read() {
        None => rsx! { Loader {} },
        Some(Err(e)) => rsx! {
            div { class: "alert alert-error", "Could not load users: {e}" }
        },
        Some(Ok(records)) if records.is_empty() => rsx! {
            p { class: "muted", "No users found." }
        },
        Some(Ok(records)) => {
            let rows = user_rows(records, own_email.as_deref());
            rsx! {
                table {
                    thead {
                        tr {
                            th { "Name" }
                            th { "Email" }
                            th { "Role" }
                            th { "" }
                        }
                    }
                    tbody {
                        for row in rows {
                            tr {
                                key: "{row.record.email}",
                                td { "{row.name}" }
                                td { "{row.record.email}" }
                                td {
                                    select {
                                        class: "input input-sm",
                                        value: row.role.as_str(),
                                        disabled: row.is_self,
                                        onchange: {
                                            let record = row.record.clone();
                                            let change_role = change_role.clone();
                                            move |evt: FormEvent| change_role((record.clone(), evt.value()))
                                        },
                                        for role in Role::ALL {
                                            option {
                                                value: role.as_str(),
                                                selected: role == row.role,
                                                "{role}"
                                            }
                                        }
                                    }
                                }
                                td {
                                    button {
                                        class: "btn btn-danger btn-sm",
                                        disabled: row.is_self,
                                        onclick: {
                                            let record = row.record.clone();
                                            let remove_user = remove_user.clone();
                                            move |_| remove_user(record.clone())
                                        },
                                        "Remove"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        section {
            class: "manage-users",
            h1 { "Manage users" }
            input {
                class: "input",
                r#type: "search",
                placeholder: "Search by name or email...",
                value: search(),
                oninput: move |evt: FormEvent| search.set(evt.value()),
            }
            {content}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str, role: Option<Role>) -> UserRecord {
        UserRecord {
            id: None,
            email: email.to_string(),
            name: None,
            photo: None,
            role,
        }
    }

    #[test]
    fn test_rows_mark_own_account() {
        let records = vec![
            record("admin@example.com", Some(Role::Admin)),
            record("rider@example.com", Some(Role::Rider)),
            record("new@example.com", None),
        ];

        let rows = user_rows(&records, Some("Admin@Example.com"));
        assert!(rows[0].is_self);
        assert!(!rows[1].is_self);
        assert_eq!(rows[2].role, Role::User);
        assert_eq!(rows[2].name, "new@example.com");
    }
}
