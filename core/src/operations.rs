use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_OFFSET, GLYPH_SIZE, MEMORY_SIZE, STACK_DEPTH};
use crate::error::Chip8Error;
use crate::opcode::Opcode;
use crate::state::State;

/// 00E0: clear the display
pub fn clr(_op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    Ok(State {
        pc: state.pc + 0x2,
        frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    })
}

/// 00EE: PC = STACK.pop()
pub fn rts(_op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    if state.sp == 0 {
        return Err(Chip8Error::StackUnderflow { pc: state.pc });
    }
    let sp = state.sp - 1;
    Ok(State {
        // The pushed address is the call site itself, so resume just past it
        pc: state.stack[sp as usize] + 0x2,
        sp,
        ..*state
    })
}

/// 1NNN: PC = nnn
pub fn jump(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    Ok(State {
        pc: op.nnn(),
        ..*state
    })
}

/// 2NNN: STACK.push(PC); PC = nnn
pub fn call(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    if state.sp as usize == STACK_DEPTH {
        return Err(Chip8Error::StackOverflow { pc: state.pc });
    }
    let mut stack = state.stack;
    stack[state.sp as usize] = state.pc;
    Ok(State {
        pc: op.nnn(),
        sp: state.sp + 1,
        stack,
        ..*state
    })
}

/// 3XNN: if Vx == nn then skip
pub fn ske(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let pc = if state.v[op.x() as usize] == op.nn() {
        state.pc + 0x4
    } else {
        state.pc + 0x2
    };
    Ok(State { pc, ..*state })
}

/// 4XNN: if Vx != nn then skip
pub fn skne(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let pc = if state.v[op.x() as usize] != op.nn() {
        state.pc + 0x4
    } else {
        state.pc + 0x2
    };
    Ok(State { pc, ..*state })
}

/// 5XY0: if Vx == Vy then skip
pub fn skre(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let pc = if state.v[op.x() as usize] == state.v[op.y() as usize] {
        state.pc + 0x4
    } else {
        state.pc + 0x2
    };
    Ok(State { pc, ..*state })
}

/// 6XNN: Vx = nn
pub fn load(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    v[op.x() as usize] = op.nn();
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// 7XNN: Vx += nn, wrapping, no flag
pub fn add(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    v[op.x() as usize] = v[op.x() as usize].wrapping_add(op.nn());
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// 8XY0: Vx = Vy
pub fn mv(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    v[op.x() as usize] = v[op.y() as usize];
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// 8XY1: Vx |= Vy
pub fn or(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    v[op.x() as usize] |= v[op.y() as usize];
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// 8XY2: Vx &= Vy
pub fn and(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    v[op.x() as usize] &= v[op.y() as usize];
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// 8XY3: Vx ^= Vy
pub fn xor(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    v[op.x() as usize] ^= v[op.y() as usize];
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// 8XY4: Vx += Vy; VF = carry
pub fn addr(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let (res, carry) = state.v[op.x() as usize].overflowing_add(state.v[op.y() as usize]);
    let mut v = state.v;
    v[op.x() as usize] = res;
    v[0xF] = carry as u8;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// 8XY5: Vx -= Vy; VF = 1 if Vx > Vy else 0
pub fn sub(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    let flag = (v[op.x() as usize] > v[op.y() as usize]) as u8;
    v[op.x() as usize] = v[op.x() as usize].wrapping_sub(v[op.y() as usize]);
    v[0xF] = flag;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// 8XY6: VF = lsb(Vx); Vx >>= 1
///
/// With the shift quirk enabled Vy is copied into Vx first.
pub fn shr(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    if state.quirks.shift_reads_vy {
        v[op.x() as usize] = v[op.y() as usize];
    }
    v[0xF] = v[op.x() as usize] & 0x1;
    v[op.x() as usize] >>= 1;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// 8XY7: Vx = Vy - Vx; VF = 1 if Vy > Vx else 0
pub fn subn(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    let flag = (v[op.y() as usize] > v[op.x() as usize]) as u8;
    v[op.x() as usize] = v[op.y() as usize].wrapping_sub(v[op.x() as usize]);
    v[0xF] = flag;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// 8XYE: VF = msb(Vx); Vx <<= 1
///
/// With the shift quirk enabled Vy is copied into Vx first.
pub fn shl(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    if state.quirks.shift_reads_vy {
        v[op.x() as usize] = v[op.y() as usize];
    }
    v[0xF] = v[op.x() as usize] >> 7;
    v[op.x() as usize] <<= 1;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// 9XY0: if Vx != Vy then skip
pub fn skrne(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let pc = if state.v[op.x() as usize] != state.v[op.y() as usize] {
        state.pc + 0x4
    } else {
        state.pc + 0x2
    };
    Ok(State { pc, ..*state })
}

/// ANNN: I = nnn
pub fn loadi(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    Ok(State {
        pc: state.pc + 0x2,
        i: op.nnn(),
        ..*state
    })
}

/// BNNN: PC = V0 + nnn
pub fn jumpi(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    Ok(State {
        pc: u16::from(state.v[0x0]) + op.nnn(),
        ..*state
    })
}

/// CXNN: Vx = random byte & nn
pub fn rand(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    v[op.x() as usize] = rand::random::<u8>() & op.nn();
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// DXYN: XOR the n-row sprite at I onto the display at (Vx, Vy); VF = collision
///
/// The start position wraps around the frame, but the drawn pixels do not:
/// sprite bits that land past the right or bottom edge are dropped.
pub fn draw(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let rows = op.n() as usize;
    if rows > 0 && state.i as usize + rows > MEMORY_SIZE {
        return Err(Chip8Error::MemoryOutOfBounds {
            address: state.i + rows as u16 - 1,
        });
    }

    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;
    let start_x = state.v[op.x() as usize] as usize % DISPLAY_WIDTH;
    let start_y = state.v[op.y() as usize] as usize % DISPLAY_HEIGHT;

    v[0xF] = 0x0;
    for row in 0..rows {
        let y = start_y + row;
        if y >= DISPLAY_HEIGHT {
            break;
        }
        let sprite_row = state.memory[state.i as usize + row];
        for bit in 0..8 {
            let x = start_x + bit;
            if x >= DISPLAY_WIDTH {
                break;
            }
            let pixel = (sprite_row >> (7 - bit)) & 1;
            v[0xF] |= pixel & frame_buffer[y][x];
            frame_buffer[y][x] ^= pixel;
        }
    }

    Ok(State {
        pc: state.pc + 0x2,
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    })
}

/// EX9E: if key[Vx] pressed then skip
pub fn skpr(op: u16, state: &State, keys: [bool; 16]) -> Result<State, Chip8Error> {
    let pc = if keys[(state.v[op.x() as usize] & 0xF) as usize] {
        state.pc + 0x4
    } else {
        state.pc + 0x2
    };
    Ok(State { pc, ..*state })
}

/// EXA1: if key[Vx] not pressed then skip
pub fn skup(op: u16, state: &State, keys: [bool; 16]) -> Result<State, Chip8Error> {
    let pc = if !keys[(state.v[op.x() as usize] & 0xF) as usize] {
        state.pc + 0x4
    } else {
        state.pc + 0x2
    };
    Ok(State { pc, ..*state })
}

/// FX07: Vx = DT
pub fn moved(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    v[op.x() as usize] = state.delay_timer;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// FX0A: block until a key is pressed, then Vx = that key
///
/// If a key is already down this completes immediately; otherwise execution
/// is suspended until the driver reports one (the cycle loop watches
/// `waiting_for_key`).
pub fn keyd(op: u16, state: &State, keys: [bool; 16]) -> Result<State, Chip8Error> {
    let mut v = state.v;
    let waiting_for_key = match keys.iter().position(|&pressed| pressed) {
        Some(key) => {
            v[op.x() as usize] = key as u8;
            None
        }
        None => Some(op.x()),
    };
    Ok(State {
        pc: state.pc + 0x2,
        v,
        waiting_for_key,
        ..*state
    })
}

/// FX15: DT = Vx
pub fn loads(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    Ok(State {
        pc: state.pc + 0x2,
        delay_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// FX18: ST = Vx
pub fn loadst(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    Ok(State {
        pc: state.pc + 0x2,
        sound_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// FX1E: I += Vx; VF = 1 if the sum leaves the addressable range
pub fn addi(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let sum = u32::from(state.i) + u32::from(state.v[op.x() as usize]);
    let mut v = state.v;
    v[0xF] = (sum as usize >= MEMORY_SIZE) as u8;
    Ok(State {
        pc: state.pc + 0x2,
        i: sum as u16,
        v,
        ..*state
    })
}

/// FX29: I = address of the font glyph for hex digit Vx
pub fn ldspr(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    Ok(State {
        pc: state.pc + 0x2,
        i: FONT_OFFSET as u16 + u16::from(state.v[op.x() as usize] & 0xF) * GLYPH_SIZE,
        ..*state
    })
}

/// FX33: mem[I..I+3] = decimal digits of Vx, hundreds first
pub fn bcd(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let i = state.i as usize;
    if i + 3 > MEMORY_SIZE {
        return Err(Chip8Error::MemoryOutOfBounds { address: state.i + 2 });
    }
    let value = state.v[op.x() as usize];
    let mut memory = state.memory;
    memory[i] = value / 100;
    memory[i + 1] = value / 10 % 10;
    memory[i + 2] = value % 10;
    Ok(State {
        pc: state.pc + 0x2,
        memory,
        ..*state
    })
}

/// FX55: mem[I..=I+x] = V0..=Vx
pub fn stor(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let i = state.i as usize;
    let count = op.x() as usize + 1;
    if i + count > MEMORY_SIZE {
        return Err(Chip8Error::MemoryOutOfBounds {
            address: state.i + op.x() as u16,
        });
    }
    let mut memory = state.memory;
    memory[i..i + count].copy_from_slice(&state.v[..count]);
    Ok(State {
        pc: state.pc + 0x2,
        i: spilled_index(state, count),
        memory,
        ..*state
    })
}

/// FX65: V0..=Vx = mem[I..=I+x]
pub fn read(op: u16, state: &State, _keys: [bool; 16]) -> Result<State, Chip8Error> {
    let i = state.i as usize;
    let count = op.x() as usize + 1;
    if i + count > MEMORY_SIZE {
        return Err(Chip8Error::MemoryOutOfBounds {
            address: state.i + op.x() as u16,
        });
    }
    let mut v = state.v;
    v[..count].copy_from_slice(&state.memory[i..i + count]);
    Ok(State {
        pc: state.pc + 0x2,
        i: spilled_index(state, count),
        v,
        ..*state
    })
}

/// Post-spill value of I: the legacy interpreters walked I forward while
/// copying; modern ones leave it alone.
fn spilled_index(state: &State, count: usize) -> u16 {
    if state.quirks.spill_moves_index {
        state.i + count as u16
    } else {
        state.i
    }
}
