// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::cell::RefCell;
use std::rc::Rc;

pub type Shared<T> = Rc<RefCell<T>>;

pub fn new_shared<T>(instance: T) -> Shared<T> {
    Rc::new(RefCell::new(instance))
}
