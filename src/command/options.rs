// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Option lists for each controllable entity kind.

use super::ValueText;

/// Localization key of the "on" option.
pub const OPTION_ON: &str = "shelly.option.on";
/// Localization key of the "off" option.
pub const OPTION_OFF: &str = "shelly.option.off";
/// Localization key of the "toggle" option.
pub const OPTION_TOGGLE: &str = "shelly.option.toggle";
/// Localization key of the "open" option.
pub const OPTION_OPEN: &str = "shelly.option.open";
/// Localization key of the "close" option.
pub const OPTION_CLOSE: &str = "shelly.option.close";
/// Prefix of the position option keys; the position value is appended.
pub const POSITION_PREFIX: &str = "shelly.roller.position.";

/// Positions offered for rollers and covers: 0, 10, ..., 100.
pub fn positions() -> impl Iterator<Item = u8> {
    (0..=100).step_by(10)
}

/// Gen1 relay or light: `relay/0?turn=on`.
pub(crate) fn turn(path: &str, index: u32) -> Vec<ValueText> {
    let base = format!("{path}/{index}?turn=");
    vec![
        ValueText::new(format!("{base}on"), OPTION_ON),
        ValueText::new(format!("{base}off"), OPTION_OFF),
        ValueText::new(format!("{base}toggle"), OPTION_TOGGLE),
    ]
}

/// Gen1 roller: `roller/0/go=open` plus `roller/0/go=to_pos&roller_pos=N`.
pub(crate) fn roller(index: u32) -> Vec<ValueText> {
    let base = format!("roller/{index}/go=");
    let mut options = vec![
        ValueText::new(format!("{base}open"), OPTION_OPEN),
        ValueText::new(format!("{base}close"), OPTION_CLOSE),
    ];
    options.extend(
        positions()
            .map(|pos| ValueText::new(format!("{base}to_pos&roller_pos={pos}"), position_key(pos))),
    );
    options
}

/// Gen2 switch or light: `Switch.Set?id=0&on=true`.
pub(crate) fn rpc_set(namespace: &str, index: u32) -> Vec<ValueText> {
    vec![
        ValueText::new(format!("{namespace}.Set?id={index}&on=true"), OPTION_ON),
        ValueText::new(format!("{namespace}.Set?id={index}&on=false"), OPTION_OFF),
        ValueText::new(format!("{namespace}.Toggle?id={index}"), OPTION_TOGGLE),
    ]
}

/// Gen2 cover: `Cover.Open?id=0` plus `Cover.GoToPosition?id=0&pos=N`.
pub(crate) fn rpc_cover(index: u32) -> Vec<ValueText> {
    let mut options = vec![
        ValueText::new(format!("Cover.Open?id={index}"), OPTION_OPEN),
        ValueText::new(format!("Cover.Close?id={index}"), OPTION_CLOSE),
    ];
    options.extend(positions().map(|pos| {
        ValueText::new(
            format!("Cover.GoToPosition?id={index}&pos={pos}"),
            position_key(pos),
        )
    }));
    options
}

fn position_key(pos: u8) -> String {
    format!("{POSITION_PREFIX}{pos}")
}
