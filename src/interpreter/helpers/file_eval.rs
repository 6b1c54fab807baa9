//! Evaluates [`FileTestOperator`]/[`BinaryFileTestOperator`] against the real
//! filesystem (unlike the virtual-fs origin of these enums, this shell talks
//! to actual inodes via `std::fs`/`nix`).

use super::file_tests::{BinaryFileTestOperator, FileTestOperator};
use std::os::unix::fs::{MetadataExt, PermissionsExt};

pub fn evaluate_unary(op: FileTestOperator, path: &str) -> bool {
    use FileTestOperator::*;
    match op {
        Exists | ExistsDeprecated => std::path::Path::new(path).exists(),
        RegularFile => std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false),
        Directory => std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false),
        Readable => nix::unistd::access(path, nix::unistd::AccessFlags::R_OK).is_ok(),
        Writable => nix::unistd::access(path, nix::unistd::AccessFlags::W_OK).is_ok(),
        Executable => nix::unistd::access(path, nix::unistd::AccessFlags::X_OK).is_ok(),
        NonEmpty => std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false),
        SymbolicLink | SymbolicLinkH => std::fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false),
        StickyBit => mode_bit(path, libc::S_ISVTX),
        SetGid => mode_bit(path, libc::S_ISGID),
        SetUid => mode_bit(path, libc::S_ISUID),
        OwnedByGroup => std::fs::metadata(path)
            .map(|m| m.gid() == nix::unistd::getegid().as_raw())
            .unwrap_or(false),
        OwnedByUser => std::fs::metadata(path)
            .map(|m| m.uid() == nix::unistd::geteuid().as_raw())
            .unwrap_or(false),
        BlockSpecial => std::fs::metadata(path).map(|m| m.file_type().is_block_device()).unwrap_or(false),
        CharSpecial => std::fs::metadata(path).map(|m| m.file_type().is_char_device()).unwrap_or(false),
        NamedPipe => std::fs::metadata(path).map(|m| m.file_type().is_fifo()).unwrap_or(false),
        Socket => std::fs::metadata(path).map(|m| m.file_type().is_socket()).unwrap_or(false),
        Terminal => path
            .parse::<i32>()
            .map(|fd| unsafe { libc::isatty(fd) } != 0)
            .unwrap_or(false),
        ModifiedSinceRead => std::fs::metadata(path).map(|m| m.mtime() > m.atime()).unwrap_or(false),
    }
}

fn mode_bit(path: &str, bit: u32) -> bool {
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & bit != 0)
        .unwrap_or(false)
}

pub fn evaluate_binary(op: BinaryFileTestOperator, left: &str, right: &str) -> bool {
    use BinaryFileTestOperator::*;
    match op {
        NewerThan => match (std::fs::metadata(left), std::fs::metadata(right)) {
            (Ok(l), Ok(r)) => l.modified().ok() > r.modified().ok(),
            (Ok(_), Err(_)) => true,
            _ => false,
        },
        OlderThan => match (std::fs::metadata(left), std::fs::metadata(right)) {
            (Ok(l), Ok(r)) => l.modified().ok() < r.modified().ok(),
            (Err(_), Ok(_)) => true,
            _ => false,
        },
        SameFile => match (std::fs::metadata(left), std::fs::metadata(right)) {
            (Ok(l), Ok(r)) => l.dev() == r.dev() && l.ino() == r.ino(),
            _ => false,
        },
    }
}

use std::os::unix::fs::FileTypeExt;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_detection() {
        assert!(evaluate_unary(FileTestOperator::Directory, "/tmp"));
        assert!(!evaluate_unary(FileTestOperator::RegularFile, "/tmp"));
    }

    #[test]
    fn missing_path_is_false() {
        assert!(!evaluate_unary(FileTestOperator::Exists, "/no/such/path/hopefully"));
    }
}
