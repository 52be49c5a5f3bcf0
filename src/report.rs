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

use std::io::{self, Write};

use crate::hwmon::PwmChip;

/// Human-readable PWM inventory for `aiowarden list`.
pub fn write_pwm_listing<W: Write>(out: &mut W, chips: &[PwmChip]) -> io::Result<()> {
    writeln!(out, "Available PWM devices:")?;

    if chips.is_empty() {
        writeln!(out, "No available PWM devices found.")?;
        writeln!(out, "Make sure lm-sensors package is installed: sudo apt install lm-sensors")?;
        writeln!(out, "Search for sensors with: sudo sensors-detect")?;
        return Ok(());
    }

    for chip in chips {
        writeln!(out)?;
        writeln!(out, "{} ({}):", chip.path.display(), chip.name.as_deref().unwrap_or("Unknown"))?;
        for node in &chip.nodes {
            writeln!(out, "  {}", node.path.display())?;
            writeln!(out, "    Description: {}", node.label.as_deref().unwrap_or("No description"))?;
            writeln!(out, "    Current value: {}", node.value.as_deref().unwrap_or("Unable to read"))?;
            writeln!(out, "    Mode: {}", node.mode)?;
        }
    }
    Ok(())
}
