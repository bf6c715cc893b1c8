pub mod system_ssh_launcher;

pub use system_ssh_launcher::SystemSshLauncher;
