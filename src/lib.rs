// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tessera-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tessera and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tessera: row-major renumbering of jigsaw puzzle pieces.
//!
//! Pieces are clustered into rows by vertical position, numbered left-to-right and top-to-bottom,
//! and every id-bearing artifact of a puzzle folder is rewritten to the new numbering.

pub mod batch;
pub mod catalog;
pub mod check;
pub mod layout;
pub mod model;
pub mod store;
