// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Puzzle folder filesystem helpers:
/// json reads, asset copying, staged folder replacement, and safe atomic writes.
fn read_json(path: &Path) -> Result<Option<Value>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Directory entries sorted by file name, so copies and errors are deterministic.
fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>, StoreError> {
    let io_err = |source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<io::Result<Vec<_>>>()
        .map_err(io_err)?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), StoreError> {
    fs::copy(from, to).map(|_| ()).map_err(|source| StoreError::Io {
        path: from.to_path_buf(),
        source,
    })
}

/// Copies the files directly inside `from` into `to`, renaming `<id>.<ext>` files through
/// `translation`. Files whose stem is not an integer keep their name. Subfolders are skipped.
/// Two files mapping to the same target name (`7.png` and `07.png`) are rejected.
fn copy_renamed_assets(
    from: &Path,
    to: &Path,
    translation: &Translation<'_>,
) -> Result<usize, StoreError> {
    let mut renamed = 0;
    let mut targets = HashSet::new();
    for entry in sorted_entries(from)? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let target_name = match file_name.to_str() {
            Some(name) => renamed_asset_name(name, translation)
                .map_err(|err| StoreError::from_rekey(&path, err))?,
            None => None,
        };

        match target_name {
            Some(name) => {
                let target = to.join(&name);
                if !targets.insert(name) {
                    return Err(StoreError::MalformedArtifact {
                        source: RekeyError::DuplicateKey {
                            key: file_name.to_string_lossy().into_owned(),
                        },
                        artifact: path,
                    });
                }
                copy_file(&path, &target)?;
                renamed += 1;
            }
            None => copy_file(&path, &to.join(&file_name))?,
        }
    }
    Ok(renamed)
}

/// Recursively copies `from` into the existing folder `to`. Returns the number of files copied.
fn copy_tree(from: &Path, to: &Path) -> Result<usize, StoreError> {
    let mut copied = 0;
    for entry in sorted_entries(from)? {
        let path = entry.path();
        let target = to.join(entry.file_name());
        if path.is_dir() {
            fs::create_dir(&target).map_err(|source| StoreError::Io {
                path: target.clone(),
                source,
            })?;
            copied += copy_tree(&path, &target)?;
        } else {
            copy_file(&path, &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Builds the folder at `folder_dir/relative` in a sibling staging folder and swaps it into
/// place once `fill` succeeds. On failure the staging folder is removed and any previous folder
/// at the target is left untouched.
fn replace_dir_staged<F>(
    folder_dir: &Path,
    relative: &Path,
    durability: WriteDurability,
    fill: F,
) -> Result<usize, StoreError>
where
    F: FnOnce(&Path) -> Result<usize, StoreError>,
{
    validate_relative_path("dir", relative)?;
    let parent_rel = relative.parent().unwrap_or_else(|| Path::new(""));
    create_dir_all_safe(folder_dir, parent_rel)?;

    let target = folder_dir.join(relative);
    let target_exists = match fs::symlink_metadata(&target) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused { path: target });
        }
        Ok(_) => true,
        Err(err) if err.kind() == io::ErrorKind::NotFound => false,
        Err(source) => return Err(StoreError::Io { path: target, source }),
    };

    let Some(dir_name) = target.file_name() else {
        return Err(StoreError::InvalidRelativePath {
            field: "dir",
            value: relative.to_path_buf(),
        });
    };
    let parent = folder_dir.join(parent_rel);
    let staging = parent.join(format!(
        ".tessera.tmp.{}.{}",
        dir_name.to_string_lossy(),
        temp_nanos()
    ));
    fs::create_dir(&staging).map_err(|source| StoreError::Io {
        path: staging.clone(),
        source,
    })?;

    let count = match fill(&staging) {
        Ok(count) => count,
        Err(err) => {
            let _ = fs::remove_dir_all(&staging);
            return Err(err);
        }
    };

    if target_exists {
        if let Err(source) = fs::remove_dir_all(&target) {
            let _ = fs::remove_dir_all(&staging);
            return Err(StoreError::Io { path: target, source });
        }
    }
    if let Err(source) = fs::rename(&staging, &target) {
        let _ = fs::remove_dir_all(&staging);
        return Err(StoreError::Io { path: target, source });
    }

    if durability == WriteDurability::Durable {
        sync_dir(&parent)?;
    }

    Ok(count)
}

fn temp_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}

fn sync_dir(dir: &Path) -> Result<(), StoreError> {
    #[cfg(unix)]
    {
        let handle = fs::File::open(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        handle.sync_all().map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    #[cfg(not(unix))]
    let _ = dir;

    Ok(())
}

fn validate_relative_path(field: &'static str, path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() || path.is_absolute() {
        return Err(StoreError::InvalidRelativePath {
            field,
            value: path.to_path_buf(),
        });
    }

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => {
                return Err(StoreError::InvalidRelativePath {
                    field,
                    value: path.to_path_buf(),
                });
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

fn to_relative_path(
    folder_dir: &Path,
    path: &Path,
    field: &'static str,
) -> Result<PathBuf, StoreError> {
    let relative = match path.strip_prefix(folder_dir) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) if path.is_absolute() => {
            return Err(StoreError::PathOutsideFolder {
                folder: folder_dir.to_path_buf(),
                path: path.to_path_buf(),
            });
        }
        Err(_) => path.to_path_buf(),
    };

    validate_relative_path(field, &relative)?;
    Ok(relative)
}

fn create_dir_all_safe(folder_dir: &Path, relative: &Path) -> Result<(), StoreError> {
    if relative.as_os_str().is_empty() {
        return Ok(());
    }

    validate_relative_path("dir", relative)?;

    let mut current = folder_dir.to_path_buf();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            continue;
        };

        current.push(part);

        match fs::symlink_metadata(&current) {
            Ok(md) => {
                if md.file_type().is_symlink() {
                    return Err(StoreError::SymlinkRefused { path: current });
                }
                if !md.is_dir() {
                    return Err(StoreError::Io {
                        path: current,
                        source: io::Error::new(io::ErrorKind::AlreadyExists, "expected directory"),
                    });
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(&current).map_err(|source| StoreError::Io {
                    path: current.clone(),
                    source,
                })?;
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: current,
                    source,
                })
            }
        }
    }

    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic_in_folder(
    folder_dir: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    fs::create_dir_all(folder_dir).map_err(|source| StoreError::Io {
        path: folder_dir.to_path_buf(),
        source,
    })?;

    let relative = to_relative_path(folder_dir, path, "path")?;
    let parent_rel = relative.parent().unwrap_or_else(|| Path::new(""));
    create_dir_all_safe(folder_dir, parent_rel)?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let Some(parent) = path.parent() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no parent"),
        });
    };

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let tmp_path = parent.join(format!(
        ".tessera.tmp.{}.{}",
        file_name.to_string_lossy(),
        temp_nanos()
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    file.write_all(contents).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;

    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        sync_dir(parent)?;
    }

    Ok(())
}
