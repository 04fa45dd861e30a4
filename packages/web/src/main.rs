use std::rc::Rc;
use std::sync::Arc;

use api::auth::{AuthStateListener, RestIdentityProvider};
use api::client::HttpTransport;
use api::{IdentityProvider, ImageHost, ReqwestTransport, SecureClient, SessionStore, Settings};
use dioxus::prelude::*;

use ui::{AppContext, NotificationProvider, SessionProvider, ThemeProvider};
use views::{
    AddACar, AdminLayout, AllPayments, AppLayout, BeARider, CarDetails, Cars, DashboardHome,
    DashboardLayout, ForgotPassword, Home, Login, ManageCars, ManageUsers, MyManagedCars,
    NotFound, PaymentHistory, PendingRiderRequests, PrivateLayout, Profile, Register,
    RiderLayout, RiderPayments, WaitingForApproval,
};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(AppLayout)]
        #[route("/")]
        Home {},
        #[route("/cars")]
        Cars {},
        #[route("/cars/:id?:payment")]
        CarDetails { id: String, payment: String },
        #[route("/login?:from")]
        Login { from: String },
        #[route("/register")]
        Register {},
        #[route("/forgot-password")]
        ForgotPassword {},
        #[layout(PrivateLayout)]
            #[route("/profile")]
            Profile {},
            #[route("/be-a-rider")]
            BeARider {},
            #[nest("/dashboard")]
                #[layout(DashboardLayout)]
                    #[route("/")]
                    DashboardHome {},
                    #[route("/payments")]
                    PaymentHistory {},
                    #[layout(AdminLayout)]
                        #[route("/manage-users")]
                        ManageUsers {},
                        #[route("/manage-cars")]
                        ManageCars {},
                        #[route("/waiting-for-approval")]
                        WaitingForApproval {},
                        #[route("/pending-rider-requests")]
                        PendingRiderRequests {},
                        #[route("/all-payments")]
                        AllPayments {},
                    #[end_layout]
                    #[layout(RiderLayout)]
                        #[route("/my-managed-cars")]
                        MyManagedCars {},
                        #[route("/add-car")]
                        AddACar {},
                        #[route("/rider-payments")]
                        RiderPayments {},
                    #[end_layout]
                #[end_layout]
            #[end_nest]
        #[end_layout]
        #[route("/:..segments")]
        NotFound { segments: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::launch(App);
}

/// Services plus the provider handle needed to restore and persist the sign-in.
#[derive(Clone)]
struct Boot {
    context: AppContext,
    provider: RestIdentityProvider,
}

fn boot() -> Boot {
    let settings = Settings::load();
    if settings.identity.key.is_empty() {
        tracing::warn!("IDENTITY_KEY is not set, sign-in will fail");
    }

    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::default());
    let provider =
        RestIdentityProvider::new(settings.identity.endpoints(), transport.clone())
            .with_pending_restore();
    let session = SessionStore::new(Arc::new(provider.clone()));
    let client = SecureClient::new(settings.api.url.clone(), transport.clone());
    let images = ImageHost::new(settings.imagehost.clone(), transport);

    Boot {
        context: AppContext::new(session, client, images, ui::make_prefs()),
        provider,
    }
}

#[component]
fn App() -> Element {
    let boot = use_hook(boot);

    // Keep the persisted refresh token in step with the signed-in account.
    let persisted = boot.clone();
    let _persistence = use_hook(move || {
        let prefs = persisted.context.prefs.clone();
        let provider = persisted.provider.clone();
        let listener: Arc<AuthStateListener> = Arc::new(move |_: Option<api::Principal>| {
            store::save_refresh_token(prefs.as_ref(), provider.refresh_token().as_deref());
        });
        Rc::new(persisted.provider.subscribe(listener))
    });

    let restoring = boot.clone();
    use_future(move || {
        let boot = restoring.clone();
        async move {
            let token = store::load_refresh_token(boot.context.prefs.as_ref());
            boot.provider.restore(token).await;
        }
    });

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        SessionProvider {
            context: boot.context.clone(),
            ThemeProvider {
                NotificationProvider {
                    Router::<Route> {}
                }
            }
        }
    }
}
