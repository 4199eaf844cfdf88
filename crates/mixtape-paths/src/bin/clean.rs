use mixtape_paths::MixtapePaths;
use std::path::Path;

fn main() {
    let paths = match MixtapePaths::new() {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Could not resolve Mixtape's folders: {e}");
            std::process::exit(1);
        }
    };

    println!("Removing Mixtape's local state:");
    println!("- Config: {}", paths.config_dir.display());
    println!("- Data: {}", paths.data_dir.display());
    println!();

    clean_directory(&paths.config_dir, "config");
    clean_directory(&paths.data_dir, "data");

    println!("\nDone.");
}

fn clean_directory(path: &Path, name: &str) {
    if path.exists() {
        print!("- Removing {name} folder: ");
        match std::fs::remove_dir_all(path) {
            Ok(_) => println!("ok"),
            Err(e) => println!("failed: {e}"),
        }
    } else {
        println!("- No {name} folder, skipping.");
    }
}
