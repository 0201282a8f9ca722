//! Usage text.

/// Print usage to stderr.
pub fn print_usage(program: &str) {
    eprintln!("Usage: {} [option]* [file]", program);
    eprintln!();
    eprintln!("The following arguments are supported :");
    eprintln!("  -0         disable compression, only uses format");
    eprintln!("  -1         enable compression [default]");
    eprintln!("  -b <size>  only use <size> bytes from the input file");
    eprintln!("  -c         send output to stdout [default]");
    eprintln!("  -f         force sending output to a terminal");
    eprintln!("  -h         display this help");
    eprintln!("  -l <loops> loop <loops> times over the same file");
    eprintln!("  -t         test mode: do not emit anything");
    eprintln!("  -v         increase verbosity");
    eprintln!("  -q         decrease verbosity");
    eprintln!();
    eprintln!("  -D         use raw Deflate output format (RFC1951)");
    eprintln!("  -G         use Gzip output format (RFC1952) [default]");
    eprintln!("  -Z         use Zlib output format (RFC1950)");
    eprintln!();
    eprintln!("If no file is specified, stdin will be used instead.");
}
