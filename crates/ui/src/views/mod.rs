mod access;
mod exam;
mod home;
mod manage_users;
mod moderator;
mod results;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use access::AccessDenied;
pub use exam::ExamView;
pub use home::HomeView;
pub use manage_users::ManageUsersView;
pub use moderator::ModeratorDashboardView;
pub use results::ResultsView;
pub use state::ViewError;
