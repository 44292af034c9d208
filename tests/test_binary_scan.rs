//! Integration tests for the binary scan pipeline, driven by stub shell
//! scripts standing in for objdump and addr2line. Unix-only: the stubs need
//! the executable bit.
#![cfg(unix)]

use covmap::binary_scan::BinaryScanner;
use covmap::coverage_log::scan_log_tree;
use covmap::cov_points::PointExtractor;
use covmap::symbolication::Symbolicator;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn write_elf(path: &Path) {
    fs::write(path, b"\x7FELF\x02\x01\x01\x00padding").unwrap();
}

/// Stub disassembler: two coverage-intrinsic calls, one PLT-indirect and one
/// direct, among unrelated instructions.
fn stub_objdump(dir: &Path) -> PathBuf {
    let path = dir.join("objdump");
    write_executable(
        &path,
        "#!/bin/sh\n\
         cat <<'EOF'\n\
         0000000000401000 <main> push %rbp\n\
         0000000000401005 <main+0x5> call 0000000000401100 <__sanitizer_cov@plt>\n\
         000000000040100a <main+0xa> mov %eax,%ebx\n\
         000000000040100f <main+0xf> call 0000000000402000 <printf@plt>\n\
         0000000000401014 <main+0x14> call 0000000000401100 <__sanitizer_cov>\n\
         0000000000401019 <main+0x19> ret\n\
         EOF\n",
    );
    path
}

/// Stub resolver: echoes each address, then one frame for the first and two
/// inlined frames for every later one.
fn stub_addr2line(dir: &Path) -> PathBuf {
    let path = dir.join("addr2line");
    write_executable(
        &path,
        "#!/bin/sh\n\
         n=0\n\
         while read addr; do\n\
         \tprintf '%s\\n' \"$addr\"\n\
         \tif [ \"$n\" -eq 0 ]; then\n\
         \t\tprintf '/src/app/main.c:42\\n'\n\
         \telse\n\
         \t\tprintf '/src/app/inline.h:7 (discriminator 2)\\n'\n\
         \t\tprintf '/src/app/main.c:99\\n'\n\
         \tfi\n\
         \tn=$((n+1))\n\
         done\n",
    );
    path
}

fn scanner_with_stubs(tools: &Path, jobs: usize) -> BinaryScanner {
    BinaryScanner::new(
        PointExtractor::new(stub_objdump(tools)),
        Symbolicator::new(stub_addr2line(tools)),
        Some(jobs),
    )
}

#[test]
fn test_scan_resolves_points_with_inlined_frames() {
    let tools = tempfile::tempdir().unwrap();
    let bins = tempfile::tempdir().unwrap();
    write_elf(&bins.path().join("bin_a"));

    let table = scanner_with_stubs(tools.path(), 2).scan(bins.path()).unwrap();
    assert_eq!(table.len(), 1);

    let addrs = &table["bin_a"];
    assert_eq!(addrs.len(), 2);

    // First point: single frame, no discriminator.
    let first = &addrs[&0x401009];
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].path, PathBuf::from("/src/app/main.c"));
    assert_eq!(first[0].line, 42);
    assert_eq!(first[0].discriminator, 0);

    // Second point: two inlined frames, resolver emission order preserved.
    let second = &addrs[&0x401018];
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].path, PathBuf::from("/src/app/inline.h"));
    assert_eq!(second[0].line, 7);
    assert_eq!(second[0].discriminator, 2);
    assert_eq!(second[1].path, PathBuf::from("/src/app/main.c"));
    assert_eq!(second[1].line, 99);
}

#[test]
fn test_duplicate_basename_keeps_first() {
    let tools = tempfile::tempdir().unwrap();
    let bins = tempfile::tempdir().unwrap();
    write_elf(&bins.path().join("bin_a"));
    let sub = bins.path().join("other-tree");
    fs::create_dir(&sub).unwrap();
    write_elf(&sub.join("bin_a"));
    fs::write(bins.path().join("notes.txt"), "not elf").unwrap();

    let table = scanner_with_stubs(tools.path(), 2).scan(bins.path()).unwrap();
    assert_eq!(table.len(), 1);
    assert!(table.contains_key("bin_a"));
}

#[test]
fn test_failing_tool_leaves_entry_absent() {
    let tools = tempfile::tempdir().unwrap();
    let bins = tempfile::tempdir().unwrap();
    write_elf(&bins.path().join("bin_a"));

    // Disassembler that produces nothing and fails.
    let bad_objdump = tools.path().join("objdump");
    write_executable(&bad_objdump, "#!/bin/sh\nexit 3\n");

    let scanner = BinaryScanner::new(
        PointExtractor::new(&bad_objdump),
        Symbolicator::new(stub_addr2line(tools.path())),
        Some(1),
    );
    let table = scanner.scan(bins.path()).unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_end_to_end_intersection() {
    let tools = tempfile::tempdir().unwrap();
    let bins = tempfile::tempdir().unwrap();
    write_elf(&bins.path().join("bin_a"));

    // Runtime log: only the first coverage point was hit.
    let logs = tempfile::tempdir().unwrap();
    let blob: Vec<u8> = 0x0040_1009_u32.to_ne_bytes().to_vec();
    fs::write(logs.path().join("bin_a.1234.sancov"), blob).unwrap();

    let coverage = scan_log_tree(logs.path()).unwrap();
    let table = scanner_with_stubs(tools.path(), 1).scan(bins.path()).unwrap();

    // The intersection is the caller's job; do it the way a caller would.
    let hit = &coverage["bin_a"];
    let executed: Vec<_> = table["bin_a"]
        .iter()
        .filter(|(addr, _)| hit.contains(*addr))
        .collect();
    assert_eq!(executed.len(), 1);
    assert_eq!(*executed[0].0, 0x401009);
    assert_eq!(executed[0].1[0].line, 42);
}

/// Regression test for the pipe deadlock: feed far more addresses through the
/// resolver than an OS pipe buffer holds. With a serial write-then-read
/// implementation this hangs; with the concurrent writer it finishes.
#[test]
fn test_resolver_pipe_does_not_deadlock_at_volume() {
    const POINTS: usize = 20_000;

    let tools = tempfile::tempdir().unwrap();
    let bins = tempfile::tempdir().unwrap();
    write_elf(&bins.path().join("bin_big"));

    // Generate a transcript with POINTS intrinsic calls.
    let transcript = tools.path().join("transcript.txt");
    {
        let mut out = std::io::BufWriter::new(fs::File::create(&transcript).unwrap());
        for i in 0..POINTS {
            let addr = 0x40_0000 + (i as u64) * 0x10;
            writeln!(
                out,
                "{addr:016x} <f+0x{i:x}> call 0000000000401100 <__sanitizer_cov@plt>"
            )
            .unwrap();
            writeln!(out, "{:016x} <f+0x{:x}> mov %eax,%ebx", addr + 5, i).unwrap();
        }
    }

    let objdump = tools.path().join("objdump");
    write_executable(&objdump, &format!("#!/bin/sh\ncat '{}'\n", transcript.display()));

    let addr2line = tools.path().join("addr2line");
    write_executable(
        &addr2line,
        "#!/bin/sh\nwhile read addr; do printf '%s\\n/src/big.c:1\\n' \"$addr\"; done\n",
    );

    let scanner = BinaryScanner::new(
        PointExtractor::new(&objdump),
        Symbolicator::new(&addr2line),
        Some(1),
    );
    let table = scanner.scan(bins.path()).unwrap();
    assert_eq!(table["bin_big"].len(), POINTS);
    assert_eq!(table["bin_big"][&0x40_0004][0].line, 1);
}
