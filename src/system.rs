/*
 * This file is part of aiowarden.
 *
 * Copyright (C) 2025 aiowarden contributors
 *
 * aiowarden is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * aiowarden is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with aiowarden. If not, see <https://www.gnu.org/licenses/>.
 */

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// access(2) with W_OK, evaluated against the real uid like the kernel does
/// for sysfs attribute writes from a non-setuid process.
pub fn is_writable(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}
