use std::env;
use std::process;

fn print_usage() {
    eprintln!("Usage: fastget [OPTIONS] <page-url>");
    eprintln!();
    eprintln!("Scrapes <page-url> for download links, resolves each link to a direct");
    eprintln!("file URL, and downloads the files you pick. Unfinished batches resume");
    eprintln!("on the next run against the same page.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <DIR>    Directory to download into (default: ~/Downloads)");
    eprintln!("      --prefix <URL>    Only collect links starting with this prefix");
    eprintln!("      --timeout <SECS>  HTTP timeout per request (default: 300)");
    eprintln!("  -y, --yes             Download every resolved file without asking");
    eprintln!("  -h, --help            Show this help");
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();

    let mut output: Option<String> = None;
    let mut prefix: Option<String> = None;
    let mut timeout: Option<u64> = None;
    let mut yes = false;
    let mut url: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "-y" | "--yes" => yes = true,
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output = Some(args[i].clone());
                } else {
                    eprintln!("Error: --output requires a value");
                    process::exit(2);
                }
            }
            "--prefix" => {
                i += 1;
                if i < args.len() {
                    prefix = Some(args[i].clone());
                } else {
                    eprintln!("Error: --prefix requires a value");
                    process::exit(2);
                }
            }
            "--timeout" => {
                i += 1;
                if i < args.len() {
                    match args[i].parse::<u64>() {
                        Ok(secs) => timeout = Some(secs),
                        Err(_) => {
                            eprintln!("Error: --timeout expects a number of seconds");
                            process::exit(2);
                        }
                    }
                } else {
                    eprintln!("Error: --timeout requires a value");
                    process::exit(2);
                }
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: unknown option '{arg}'");
                print_usage();
                process::exit(2);
            }
            arg => {
                if url.is_some() {
                    eprintln!("Error: expected exactly one page URL");
                    process::exit(2);
                }
                url = Some(arg.to_string());
            }
        }
        i += 1;
    }

    let Some(url) = url else {
        print_usage();
        process::exit(if args.is_empty() { 0 } else { 2 });
    };

    if !url.starts_with("http://") && !url.starts_with("https://") {
        eprintln!("Error: page URL must start with http:// or https://");
        process::exit(2);
    }

    let mut config = fastget::Config::load_or_default();
    if let Some(dir) = output {
        config = config.with_download_dir(dir);
    }
    if let Some(prefix) = prefix {
        config = config.with_link_prefix(prefix);
    }
    if let Some(secs) = timeout {
        config = config.with_request_timeout_secs(secs);
    }

    #[cfg(feature = "cli")]
    {
        process::exit(fastget::cli::run(config, url, yes));
    }
    #[cfg(not(feature = "cli"))]
    {
        let _ = (config, yes);
        eprintln!("CLI support not compiled in");
        process::exit(1);
    }
}
