mod layouts;
pub use layouts::{AdminLayout, AppLayout, DashboardLayout, PrivateLayout, RiderLayout};

mod home;
pub use home::{Cars, Home, NotFound};

mod car_details;
pub use car_details::CarDetails;

mod login;
pub use login::Login;

mod register;
pub use register::Register;

mod forgot_password;
pub use forgot_password::ForgotPassword;

mod profile;
pub use profile::Profile;

mod be_a_rider;
pub use be_a_rider::BeARider;

mod dashboard;
pub use dashboard::{AllPayments, DashboardHome, MyManagedCars, PaymentHistory, RiderPayments};

mod moderation;
pub use moderation::{ManageCars, PendingRiderRequests, WaitingForApproval};

mod add_car;
pub use add_car::AddACar;

mod manage_users;
pub use manage_users::ManageUsers;

mod records;
